//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`].
//!
//! Storage keys are `"namespace/key"`; a key without a slash lands in the
//! default namespace.  ESP-IDF limits both parts to 15 bytes.  Commits are
//! atomic per `nvs_commit()`.
//!
//! Without the `espidf` feature the adapter keeps everything in an
//! in-memory map (dev/test only).

use log::{info, warn};

use crate::app::ports::{ConfigPort, StoragePort};
use crate::config::KettleConfig;
use crate::error::StorageError;

#[cfg(not(feature = "espidf"))]
use std::collections::HashMap;

#[cfg(feature = "espidf")]
use esp_idf_sys::*;

const DEFAULT_NAMESPACE: &str = "kettlebridge";
const CONFIG_KEY: &str = "kettlebridge/config";

/// Longest namespace or key ESP-IDF accepts.
const NVS_NAME_MAX: usize = 15;

#[allow(dead_code)]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsAdapter {
    /// `false` when flash init failed; every operation then reports
    /// [`StorageError::IoError`] and the firmware runs on in-memory values.
    ready: bool,
    #[cfg(not(feature = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

/// Split `"namespace/key"` and check the ESP-IDF length limits.
fn split_key(key: &str) -> Result<(&str, &str), StorageError> {
    let (namespace, name) = key.split_once('/').unwrap_or((DEFAULT_NAMESPACE, key));
    if namespace.is_empty() || name.is_empty() {
        return Err(StorageError::ValidationFailed("empty NVS namespace or key"));
    }
    if namespace.len() > NVS_NAME_MAX || name.len() > NVS_NAME_MAX {
        return Err(StorageError::ValidationFailed("NVS name longer than 15 bytes"));
    }
    Ok((namespace, name))
}

impl NvsAdapter {
    /// Initialise NVS flash.
    ///
    /// On first boot or after a version mismatch the partition is erased
    /// and re-initialised automatically.
    pub fn new() -> Result<Self, StorageError> {
        #[cfg(feature = "espidf")]
        {
            // SAFETY: called once from the main task before any NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32
                || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32
            {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(StorageError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(StorageError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(feature = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            ready: true,
            #[cfg(not(feature = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    /// Adapter for a device whose NVS could not be initialised.
    pub fn unavailable() -> Self {
        Self {
            ready: false,
            #[cfg(not(feature = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn check_ready(&self) -> Result<(), StorageError> {
        if self.ready {
            Ok(())
        } else {
            Err(StorageError::IoError)
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{namespace}::{key}")
    }

    /// NUL-terminated copy of a namespace or key.
    #[cfg(feature = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let len = name.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Open an NVS namespace, execute a closure with the handle, then close.
    #[cfg(feature = "espidf")]
    fn with_nvs_handle<F, T>(namespace: &str, write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let ns = Self::c_name(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(ns.as_ptr().cast(), mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    #[cfg(feature = "espidf")]
    fn map_esp(ret: i32) -> StorageError {
        if ret == ESP_ERR_NVS_NOT_FOUND as i32 {
            StorageError::NotFound
        } else if ret == ESP_ERR_NVS_INVALID_LENGTH as i32 {
            StorageError::Corrupted
        } else if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 {
            StorageError::Full
        } else {
            StorageError::IoError
        }
    }
}

// ── StoragePort ───────────────────────────────────────────────

impl StoragePort for NvsAdapter {
    fn load(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        self.check_ready()?;
        let (namespace, name) = split_key(key)?;

        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, name);
            match self.store.borrow().get(&composite) {
                // ESP-IDF refuses blobs larger than the caller's buffer.
                Some(data) if data.len() > buf.len() => Err(StorageError::Corrupted),
                Some(data) => {
                    buf[..data.len()].copy_from_slice(data);
                    Ok(data.len())
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(feature = "espidf")]
        {
            let key_c = Self::c_name(name);
            Self::with_nvs_handle(namespace, false, |handle| {
                let mut size = buf.len();
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        key_c.as_ptr().cast(),
                        buf.as_mut_ptr().cast(),
                        &mut size,
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(size)
            })
            .map_err(Self::map_esp)
        }
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.check_ready()?;
        let (namespace, name) = split_key(key)?;

        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, name);
            self.store.borrow_mut().insert(composite, bytes.to_vec());
            Ok(())
        }

        #[cfg(feature = "espidf")]
        {
            let key_c = Self::c_name(name);
            Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        key_c.as_ptr().cast(),
                        bytes.as_ptr().cast(),
                        bytes.len(),
                    )
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            })
            .map_err(Self::map_esp)
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.check_ready()?;
        let (namespace, name) = split_key(key)?;

        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, name);
            self.store.borrow_mut().remove(&composite);
            Ok(())
        }

        #[cfg(feature = "espidf")]
        {
            let key_c = Self::c_name(name);
            let result = Self::with_nvs_handle(namespace, true, |handle| {
                let ret = unsafe { nvs_erase_key(handle, key_c.as_ptr().cast()) };
                if ret != ESP_OK as i32 && ret != ESP_ERR_NVS_NOT_FOUND as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                // Namespace never written: nothing to remove.
                Err(e) if e != ESP_ERR_NVS_NOT_FOUND as i32 => Err(Self::map_esp(e)),
                _ => Ok(()),
            }
        }
    }
}

// ── ConfigPort ────────────────────────────────────────────────

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<KettleConfig, StorageError> {
        self.check_ready()?;
        let (namespace, name) = split_key(CONFIG_KEY)?;

        #[cfg(not(feature = "espidf"))]
        let stored = self
            .store
            .borrow()
            .get(&Self::composite_key(namespace, name))
            .cloned();

        #[cfg(feature = "espidf")]
        let stored = {
            let key_c = Self::c_name(name);
            let result = Self::with_nvs_handle(namespace, false, |handle| {
                // First call: get size
                let mut size: usize = 0;
                let ret = unsafe {
                    nvs_get_blob(handle, key_c.as_ptr().cast(), core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                if size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ESP_ERR_NVS_INVALID_LENGTH as i32);
                }
                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(handle, key_c.as_ptr().cast(), buf.as_mut_ptr().cast(), &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(buf)
            });
            match result {
                Ok(bytes) => Some(bytes),
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => None,
                Err(e) => return Err(Self::map_esp(e)),
            }
        };

        let Some(bytes) = stored else {
            info!("NvsAdapter: no stored config, using defaults");
            return Ok(KettleConfig::default());
        };
        let config: KettleConfig =
            postcard::from_bytes(&bytes).map_err(|_| StorageError::Corrupted)?;
        config.validate()?;
        info!("NvsAdapter: loaded config ({} bytes)", bytes.len());
        Ok(config)
    }

    fn save(&mut self, config: &KettleConfig) -> Result<(), StorageError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| StorageError::IoError)?;
        StoragePort::save(self, CONFIG_KEY, &bytes).inspect_err(|e| {
            warn!("NvsAdapter: config write failed: {e}");
        })?;
        info!("NvsAdapter: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
