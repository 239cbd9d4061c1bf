use crate::error::{CloseError, SendError};
use crate::message::{CloseReason, NotificationEvent};
use dashmap::DashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Identifies the job whose updates a connection subscribes to.
/// Derived from the job's file name; compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The job id for a job file: the final component of `file_name`.
    /// Names without a final component (such as `..`) are kept as given.
    pub fn from_file_name(file_name: &str) -> Self {
        let name = Path::new(file_name)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(file_name);
        Self::new(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a connection, assigned by the hosting transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One subscriber's open channel.
///
/// Both operations must return without waiting on the network: the hub calls
/// them while fanning out to every member of a channel.
pub trait Connection: Send + Sync {
    fn id(&self) -> &ConnectionId;

    /// Queue `event` for delivery to the subscriber.
    fn send(&self, event: &NotificationEvent) -> Result<(), SendError>;

    /// Ask the transport to close the connection with `reason`.
    fn close(&self, reason: &CloseReason) -> Result<(), CloseError>;
}

/// Members of one job's channel, keyed by connection id.
pub type JobChannel = Arc<DashMap<ConnectionId, Arc<dyn Connection>>>;

/// Concurrent two-level registry: job id -> (connection id -> connection).
///
/// Channels are created on first subscription and are never removed, so a
/// concurrent `register` can never insert into a channel that is being
/// dropped.
pub struct ConnectionRegistry {
    channels: DashMap<JobId, JobChannel>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Subscribe `connection` to `job_id`. Returns `false` if the id was
    /// already a member (its handle is replaced, never duplicated).
    pub fn register(
        &self,
        job_id: JobId,
        connection_id: ConnectionId,
        connection: Arc<dyn Connection>,
    ) -> bool {
        // The entry API holds the shard lock across get-or-create, so racing
        // first subscriptions share one channel.
        let channel = Arc::clone(self.channels.entry(job_id).or_default().value());
        channel.insert(connection_id, connection).is_none()
    }

    /// Remove `connection_id` from `job_id`'s channel. Absent channels and
    /// members are a no-op. An emptied channel is kept.
    pub fn unregister(&self, job_id: &JobId, connection_id: &ConnectionId) -> bool {
        match self.channel(job_id) {
            Some(channel) => channel.remove(connection_id).is_some(),
            None => false,
        }
    }

    /// Remove `connection_id` from every channel. Returns how many channels
    /// it was found in.
    pub fn remove_everywhere(&self, connection_id: &ConnectionId) -> usize {
        let channels: Vec<JobChannel> = self
            .channels
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        channels
            .iter()
            .filter(|channel| channel.remove(connection_id).is_some())
            .count()
    }

    /// Snapshot of the connections currently subscribed to `job_id`.
    pub fn channel_for(&self, job_id: &JobId) -> Vec<Arc<dyn Connection>> {
        self.channel(job_id)
            .map(|channel| Self::members(&channel))
            .unwrap_or_default()
    }

    /// Snapshot of every channel and its members.
    pub fn channels(&self) -> Vec<(JobId, Vec<Arc<dyn Connection>>)> {
        let channels: Vec<(JobId, JobChannel)> = self
            .channels
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        channels
            .into_iter()
            .map(|(job_id, channel)| (job_id, Self::members(&channel)))
            .collect()
    }

    pub fn contains(&self, job_id: &JobId, connection_id: &ConnectionId) -> bool {
        self.channel(job_id)
            .map(|channel| channel.contains_key(connection_id))
            .unwrap_or(false)
    }

    /// Number of job channels, including empty ones.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of memberships across all channels.
    pub fn connection_count(&self) -> usize {
        self.channels.iter().map(|entry| entry.value().len()).sum()
    }

    // Clone the channel handle out so no registry shard lock is held while
    // the caller works with the members.
    fn channel(&self, job_id: &JobId) -> Option<JobChannel> {
        self.channels.get(job_id).map(|entry| Arc::clone(entry.value()))
    }

    fn members(channel: &JobChannel) -> Vec<Arc<dyn Connection>> {
        channel
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
