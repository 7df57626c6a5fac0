#![allow(dead_code)]

pub mod mock_store;
pub mod object_server;
