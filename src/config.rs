use crate::error::{DirectoryError, DirectoryResult, ParseServerAddrSnafu};
use dotenvy::var;
use snafu::ResultExt;
use std::{env::VarError, net::SocketAddr, sync::Arc};

/// Where the students live. Fixed at build time.
pub const STUDENTS_API_URL: &str = "http://20.2.211.179/students";

const DEFAULT_SERVER_IP: &str = "127.0.0.1:8080";

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    server_addr: SocketAddr,
    students_api_url: Arc<str>,
}

impl RuntimeConfiguration {
    pub fn new() -> DirectoryResult<Self> {
        Self::from_server_ip(optional_env_var("DIRECTORY_SERVER_IP")?)
    }

    fn from_server_ip(server_ip: Option<String>) -> DirectoryResult<Self> {
        let server_ip = server_ip.unwrap_or_else(|| DEFAULT_SERVER_IP.to_string());
        let server_addr = server_ip.parse().context(ParseServerAddrSnafu {
            original: server_ip.clone(),
        })?;

        Ok(Self {
            server_addr,
            students_api_url: Arc::from(STUDENTS_API_URL),
        })
    }

    pub const fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    pub fn students_api_url(&self) -> &str {
        &self.students_api_url
    }
}

fn optional_env_var(name: &'static str) -> DirectoryResult<Option<String>> {
    match var(name) {
        Ok(value) => Ok(Some(value)),
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
        Err(source) => Err(DirectoryError::BadEnvVar { source, name }),
    }
}
