//! NVS (Non-Volatile Storage) adapter for display preferences.
//!
//! Implements [`PreferencesStore`] with a postcard blob per key.
//!
//! - Validation: every field is range-checked before persistence and after
//!   load; an invalid stored blob falls back to defaults instead of
//!   propagating garbage brightness into the policy.
//! - Namespace isolation: everything lives under the `auxdisp` namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `nvs_commit()`.
//!
//! The simulation backend is an in-memory map with identical semantics.

use log::{info, warn};

use crate::app::ports::{PreferencesStore, PrefsError};
use crate::display::brightness::DisplayPreferences;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const PREFS_NAMESPACE: &str = "auxdisp";
#[allow(dead_code)]
const PREFS_KEY: &[u8] = b"dispprefs\0";

#[allow(dead_code)]
const MAX_BLOB_SIZE: usize = 256;

pub struct NvsAdapter {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Create the adapter and initialise NVS flash.
    ///
    /// On first boot or after a partition version mismatch the NVS
    /// partition is erased and re-initialised automatically.
    pub fn new() -> Result<Self, PrefsError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: nvs_flash_init / nvs_flash_erase are called from the
            // single main-task context before any concurrent NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES || ret == ESP_ERR_NVS_NEW_VERSION_FOUND {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK {
                    return Err(PrefsError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK {
                    return Err(PrefsError::IoError);
                }
            } else if ret != ESP_OK {
                return Err(PrefsError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key() -> String {
        format!("{}::dispprefs", PREFS_NAMESPACE)
    }

    /// Open the preferences namespace, run a closure with the handle, close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = PREFS_NAMESPACE.as_bytes();
        ns_buf[..ns_bytes.len()].copy_from_slice(ns_bytes);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK {
            return Err(ret);
        }

        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }

    fn decode(bytes: &[u8]) -> Result<DisplayPreferences, PrefsError> {
        let prefs: DisplayPreferences =
            postcard::from_bytes(bytes).map_err(|_| PrefsError::Corrupted)?;
        prefs.validate().map_err(PrefsError::ValidationFailed)?;
        Ok(prefs)
    }
}

impl PreferencesStore for NvsAdapter {
    fn load(&self) -> Result<DisplayPreferences, PrefsError> {
        #[cfg(not(target_os = "espidf"))]
        {
            match self.store.borrow().get(&Self::composite_key()) {
                Some(bytes) => match Self::decode(bytes) {
                    Ok(prefs) => {
                        info!("NvsAdapter: loaded preferences from store");
                        Ok(prefs)
                    }
                    Err(e) => {
                        warn!("NvsAdapter: stored preferences unusable ({e}), using defaults");
                        Ok(DisplayPreferences::default())
                    }
                },
                None => {
                    info!("NvsAdapter: no stored preferences, using defaults");
                    Ok(DisplayPreferences::default())
                }
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let mut size: usize = 0;

                // First call: get size
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        PREFS_KEY.as_ptr() as *const _,
                        core::ptr::null_mut(),
                        &mut size,
                    )
                };
                if ret == ESP_ERR_NVS_NOT_FOUND {
                    return Err(ESP_ERR_NVS_NOT_FOUND);
                }
                if ret != ESP_OK || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                let ret = unsafe {
                    nvs_get_blob(
                        handle,
                        PREFS_KEY.as_ptr() as *const _,
                        buf.as_mut_ptr() as *mut _,
                        &mut size,
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => match Self::decode(&bytes) {
                    Ok(prefs) => {
                        info!("NvsAdapter: loaded preferences ({} bytes)", bytes.len());
                        Ok(prefs)
                    }
                    Err(e) => {
                        warn!("NvsAdapter: stored preferences unusable ({e}), using defaults");
                        Ok(DisplayPreferences::default())
                    }
                },
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND => {
                    info!("NvsAdapter: no stored preferences, using defaults");
                    Ok(DisplayPreferences::default())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS read error {}, using defaults", e);
                    Ok(DisplayPreferences::default())
                }
            }
        }
    }

    fn save(&self, prefs: &DisplayPreferences) -> Result<(), PrefsError> {
        prefs.validate().map_err(PrefsError::ValidationFailed)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let bytes = postcard::to_allocvec(prefs).map_err(|_| PrefsError::IoError)?;
            self.store.borrow_mut().insert(Self::composite_key(), bytes);
            info!("NvsAdapter: preferences saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let bytes = postcard::to_allocvec(prefs).map_err(|_| PrefsError::IoError)?;
            let result = Self::with_nvs_handle(true, |handle| {
                let ret = unsafe {
                    nvs_set_blob(
                        handle,
                        PREFS_KEY.as_ptr() as *const _,
                        bytes.as_ptr() as *const _,
                        bytes.len(),
                    )
                };
                if ret != ESP_OK {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsAdapter: preferences saved ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsAdapter: NVS write error {}", e);
                    Err(PrefsError::IoError)
                }
            }
        }
    }
}
