//! Writer actor: a dedicated thread owning one sqlite connection, executing
//! write jobs sent over an mpsc channel. Serializing writes through one
//! connection avoids sqlite write-lock contention between concurrent tasks.

use std::any::Any;

use diesel::{Connection, SqliteConnection};
use log::error;
use tokio::sync::{mpsc, oneshot};

use adboard_core::Result;

use crate::errors::StorageError;

// A write job: takes the actor's connection, returns a type-erased result.
type Job = Box<dyn FnOnce(&mut SqliteConnection) -> Result<Box<dyn Any + Send + 'static>> + Send>;

const JOB_QUEUE_DEPTH: usize = 64;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job, oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>)>,
}

impl WriteHandle {
    /// Executes a database job on the writer actor's dedicated connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |conn| job(conn).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .expect("Writer actor's receiving channel was closed, indicating the actor stopped.");

        ret_rx
            .await
            .expect("Writer actor dropped the reply sender without sending a result.")
            .map(|boxed: Box<dyn Any + Send + 'static>| {
                *boxed
                    .downcast::<T>()
                    .unwrap_or_else(|_| panic!("Failed to downcast writer actor result."))
            })
    }
}

/// Open a dedicated write connection and start the actor thread.
pub fn spawn_writer(database_url: &str) -> Result<WriteHandle> {
    let mut conn = SqliteConnection::establish(database_url).map_err(StorageError::from)?;

    let (tx, mut rx) =
        mpsc::channel::<(Job, oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>)>(
            JOB_QUEUE_DEPTH,
        );

    std::thread::Builder::new()
        .name("adboard-db-writer".to_string())
        .spawn(move || {
            while let Some((job, reply)) = rx.blocking_recv() {
                let result = job(&mut conn);
                if reply.send(result).is_err() {
                    error!("Writer actor reply receiver dropped before result delivery");
                }
            }
        })
        .map_err(|e| StorageError::Internal(format!("Failed to spawn writer thread: {}", e)))?;

    Ok(WriteHandle { tx })
}
