//! token 持久化 - 基础设施层
//!
//! 只负责"保存 / 读取 / 清除 token"的能力，不关心认证流程

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StorageError;
use crate::models::AccessToken;

/// token 存储
///
/// 只有一个键：当前的 bearer token。
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Result<Option<AccessToken>, StorageError>;
    async fn save(&self, token: &AccessToken) -> Result<(), StorageError>;
    async fn clear(&self) -> Result<(), StorageError>;
}

/// 基于文件的 token 存储
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<AccessToken>, StorageError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    debug!("从 {} 读取到已保存的 token", self.display());
                    Ok(Some(AccessToken::new(token)))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadFailed {
                path: self.display(),
                source,
            }),
        }
    }

    async fn save(&self, token: &AccessToken) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StorageError::WriteFailed {
                    path: parent.display().to_string(),
                    source,
                })?;
        }

        fs::write(&self.path, token.as_str())
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: self.display(),
                source,
            })?;

        debug!("token 已写入 {}", self.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::DeleteFailed {
                path: self.display(),
                source,
            }),
        }
    }
}

/// 内存 token 存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<AccessToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: AccessToken) -> Self {
        Self {
            token: Mutex::new(Some(token)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<AccessToken>, StorageError> {
        Ok(self.token.lock().await.clone())
    }

    async fn save(&self, token: &AccessToken) -> Result<(), StorageError> {
        *self.token.lock().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock().await = None;
        Ok(())
    }
}
