use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use structopt::StructOpt;

use crate::db::StoreResult;
use crate::store::Store;

/// Serve the lists API over HTTP
#[derive(StructOpt, Debug)]
#[structopt(name = "serve")]
pub struct Opt {
    /// Address to listen on
    #[structopt(long, env = "LISTS_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[structopt(long, env = "LISTS_PORT", default_value = "8000")]
    pub port: u16,

    /// SQLite database file, created if missing
    #[structopt(
        long,
        env = "LISTS_DATABASE",
        parse(from_os_str),
        default_value = "lists.sqlite3"
    )]
    pub database: PathBuf,

    /// Keep everything in memory and lose it on exit
    #[structopt(long)]
    pub in_memory: bool,

    /// Log filter, e.g. `info` or `lists_server=debug`
    #[structopt(long, env = "LISTS_LOG", default_value = "info")]
    pub log: String,
}

impl Opt {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn open_store(&self) -> StoreResult<Store> {
        if self.in_memory {
            Store::open_in_memory()
        } else {
            Store::open(&self.database)
        }
    }
}
