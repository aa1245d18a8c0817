//! In-process byte-stream fakes for unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::stream;
use futures::StreamExt;
use tonic::{Request, Status};

use crate::bytestream::{
    ByteStreamClient, ByteStreamConnector, ReadRequest, ReadResponse, ReadStream,
};
use crate::error::CacheError;

/// What the fake server does for one resource name.
#[derive(Clone)]
pub enum Reply {
    Chunks(Vec<&'static str>),
    Fail(Status),
    FailMidStream(&'static str, Status),
    Hang,
}

/// A request as observed by the fake server.
#[derive(Debug, Clone)]
pub struct Seen {
    pub authority: String,
    pub resource_name: String,
    pub metadata: Vec<(String, String)>,
}

#[derive(Default)]
struct Shared {
    replies: HashMap<String, Reply>,
    connects: Vec<String>,
    seen: Vec<Seen>,
}

#[derive(Clone, Default)]
pub struct FakeConnector {
    shared: Arc<Mutex<Shared>>,
}

impl FakeConnector {
    pub fn reply(self, resource_name: &str, reply: Reply) -> Self {
        self.shared
            .lock()
            .unwrap()
            .replies
            .insert(resource_name.to_string(), reply);
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.shared.lock().unwrap().connects.clone()
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.shared.lock().unwrap().seen.clone()
    }
}

impl ByteStreamConnector for FakeConnector {
    type Client = FakeClient;

    fn connect(&self, authority: &str) -> Result<FakeClient, CacheError> {
        self.shared
            .lock()
            .unwrap()
            .connects
            .push(authority.to_string());
        Ok(FakeClient {
            authority: authority.to_string(),
            shared: Arc::clone(&self.shared),
        })
    }
}

#[derive(Clone)]
pub struct FakeClient {
    authority: String,
    shared: Arc<Mutex<Shared>>,
}

impl ByteStreamClient for FakeClient {
    fn read(
        &self,
        request: Request<ReadRequest>,
    ) -> impl Future<Output = Result<ReadStream, Status>> + Send {
        let metadata = request
            .metadata()
            .iter()
            .filter_map(|entry| match entry {
                tonic::metadata::KeyAndValueRef::Ascii(k, v) => {
                    Some((k.as_str().to_string(), v.to_str().ok()?.to_string()))
                }
                tonic::metadata::KeyAndValueRef::Binary(..) => None,
            })
            .collect();
        let resource_name = request.into_inner().resource_name;

        let reply = {
            let mut shared = self.shared.lock().unwrap();
            shared.seen.push(Seen {
                authority: self.authority.clone(),
                resource_name: resource_name.clone(),
                metadata,
            });
            shared
                .replies
                .get(&resource_name)
                .cloned()
                .unwrap_or_else(|| Reply::Fail(Status::not_found(resource_name.clone())))
        };

        async move {
            match reply {
                Reply::Chunks(chunks) => Ok(stream::iter(
                    chunks
                        .into_iter()
                        .map(|c| Ok::<_, Status>(ReadResponse { data: c.as_bytes().to_vec() })),
                )
                .boxed()),
                Reply::Fail(status) => Err(status),
                Reply::FailMidStream(first, status) => Ok(stream::iter(vec![
                    Ok(ReadResponse {
                        data: first.as_bytes().to_vec(),
                    }),
                    Err(status),
                ])
                .boxed()),
                Reply::Hang => Ok(stream::pending::<Result<ReadResponse, Status>>().boxed()),
            }
        }
    }
}
