//! End-to-end tests for the ap-dirent-* crates on the host file system.
