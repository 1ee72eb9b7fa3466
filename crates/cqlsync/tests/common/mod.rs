use std::sync::Mutex;
use std::time::Duration;

use cqlsync::{BoxFuture, SessionError};

/// How the recording session answers a statement.
#[derive(Clone)]
pub enum Reply {
    AlreadyExists,
    Fail(&'static str),
    Hang(Duration),
}

/// A session that records every statement it is given.
///
/// Statements containing a scripted fragment get the scripted reply, all
/// others succeed.
#[derive(Default)]
pub struct RecordingSession {
    script: Vec<(&'static str, Reply)>,
    executed: Mutex<Vec<(Option<String>, String)>>,
}

impl RecordingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, fragment: &'static str, reply: Reply) -> Self {
        self.script.push((fragment, reply));
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn keyspaces(&self) -> Vec<Option<String>> {
        self.executed
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl cqlsync::Session for RecordingSession {
    fn execute<'a>(
        &'a self,
        keyspace: Option<&'a str>,
        statement: &'a str,
    ) -> BoxFuture<'a, Result<(), SessionError>> {
        self.executed
            .lock()
            .unwrap()
            .push((keyspace.map(str::to_string), statement.to_string()));

        let reply = self
            .script
            .iter()
            .find(|(fragment, _)| statement.contains(fragment))
            .map(|(_, reply)| reply.clone());

        Box::pin(async move {
            match reply {
                None => Ok(()),
                Some(Reply::AlreadyExists) => {
                    Err(SessionError::AlreadyExists(statement.to_string()))
                }
                Some(Reply::Fail(message)) => Err(SessionError::Failed(message.to_string())),
                Some(Reply::Hang(duration)) => {
                    tokio::time::sleep(duration).await;
                    Ok(())
                }
            }
        })
    }
}
