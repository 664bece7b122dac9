//! Job-submission client: one job per connection.

use tokio::net::{TcpStream, ToSocketAddrs};

use crate::config::DEFAULT_MAX_FRAME_LEN;
use crate::error::ProtocolError;
use crate::job::Job;
use crate::protocol::{Envelope, read_value, write_frame};

/// Submits jobs to a satellite.
#[derive(Debug, Clone)]
pub struct JobClient<A> {
    addr: A,
}

impl<A> JobClient<A>
where
    A: ToSocketAddrs + Clone,
{
    pub fn new(addr: A) -> Self {
        Self { addr }
    }

    /// Send `job` and wait for its bare result value.
    ///
    /// Returns [`ProtocolError::ConnectionClosed`] when the satellite closes
    /// the connection without answering (unknown capability, failed job).
    pub async fn submit(&self, job: &Job) -> Result<serde_json::Value, ProtocolError> {
        let mut stream = TcpStream::connect(self.addr.clone()).await?;
        let request = Envelope::job_request(job.clone()).encode()?;
        write_frame(&mut stream, &request).await?;
        read_value(&mut stream, DEFAULT_MAX_FRAME_LEN).await
    }
}
