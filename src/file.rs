use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::error::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FileHandle(pub u64);

impl FileHandle {
    pub const NULL: FileHandle = FileHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    Start,
    Current,
    End,
}

/// File access on behalf of the document engine. Failures are reported as
/// sentinels: a null handle, zero bytes, `false`.
pub trait FileInterface {
    fn open(&mut self, path: &str) -> FileHandle;
    fn close(&mut self, file: FileHandle);
    fn read(&mut self, buffer: &mut [u8], file: FileHandle) -> usize;
    fn seek(&mut self, file: FileHandle, offset: i64, origin: SeekOrigin) -> bool;
    fn tell(&mut self, file: FileHandle) -> usize;

    /// Total length in bytes; leaves the read position unchanged.
    fn length(&mut self, file: FileHandle) -> usize {
        let position = self.tell(file);
        if !self.seek(file, 0, SeekOrigin::End) {
            return 0;
        }
        let length = self.tell(file);
        self.seek(file, position as i64, SeekOrigin::Start);
        length
    }
}

/// Reads from disk, trying `root` + path before the path as given.
#[derive(Debug, Default)]
pub struct FsFileInterface {
    root: String,
    files: HashMap<FileHandle, File>,
    next_handle: u64,
}

impl FsFileInterface {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn try_open(&mut self, path: &str) -> Result<FileHandle, BridgeError> {
        let rooted = format!("{}{}", self.root, path);
        let file = File::open(&rooted)
            .or_else(|_| File::open(path))
            .map_err(|_| BridgeError::ResourceNotFound(path.to_string()))?;

        let handle = FileHandle(self.next_handle);
        self.next_handle += 1;
        self.files.insert(handle, file);
        Ok(handle)
    }

    pub fn open_count(&self) -> usize {
        self.files.len()
    }
}

impl FileInterface for FsFileInterface {
    fn open(&mut self, path: &str) -> FileHandle {
        match self.try_open(path) {
            Ok(handle) => handle,
            Err(err) => {
                debug!("open: {}", err);
                FileHandle::NULL
            }
        }
    }

    fn close(&mut self, file: FileHandle) {
        self.files.remove(&file);
    }

    fn read(&mut self, buffer: &mut [u8], file: FileHandle) -> usize {
        let Some(handle) = self.files.get_mut(&file) else {
            return 0;
        };
        // fill as much of the buffer as the file allows
        let mut total = 0;
        while total < buffer.len() {
            match handle.read(&mut buffer[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    debug!("read {:?}: {}", file, err);
                    break;
                }
            }
        }
        total
    }

    fn seek(&mut self, file: FileHandle, offset: i64, origin: SeekOrigin) -> bool {
        let Some(handle) = self.files.get_mut(&file) else {
            return false;
        };
        let target = match origin {
            SeekOrigin::Start => match u64::try_from(offset) {
                Ok(start) => SeekFrom::Start(start),
                Err(_) => return false,
            },
            SeekOrigin::Current => SeekFrom::Current(offset),
            SeekOrigin::End => SeekFrom::End(offset),
        };
        handle.seek(target).is_ok()
    }

    fn tell(&mut self, file: FileHandle) -> usize {
        self.files
            .get_mut(&file)
            .and_then(|handle| handle.stream_position().ok())
            .map_or(0, |position| position as usize)
    }
}
