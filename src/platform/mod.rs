//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Viewport size
//! - Time
//! - Storage (LocalStorage and SessionStorage on web, nothing on native)

use crate::sim::Bounds;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::Storage;

    use crate::sim::Bounds;

    pub fn viewport() -> Bounds {
        let size = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
            .map(|e| (e.client_width(), e.client_height()));
        match size {
            Some((w, h)) => Bounds::new(w, h),
            None => Bounds::default(),
        }
    }

    pub fn now_ms() -> f64 {
        js_sys::Date::now()
    }

    fn local() -> Option<Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
    }

    fn session() -> Option<Storage> {
        web_sys::window().and_then(|w| w.session_storage().ok()).flatten()
    }

    pub fn get(local_store: bool, key: &str) -> Option<String> {
        let storage = if local_store { local() } else { session() }?;
        storage.get_item(key).ok().flatten()
    }

    pub fn set(local_store: bool, key: &str, value: &str) -> bool {
        let Some(storage) = (if local_store { local() } else { session() }) else {
            log::warn!("Storage unavailable, dropping {}", key);
            return false;
        };
        match storage.set_item(key, value) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to store {}: {:?}", key, e);
                false
            }
        }
    }

    pub fn remove(local_store: bool, key: &str) {
        let storage = if local_store { local() } else { session() };
        if let Some(storage) = storage {
            let _ = storage.remove_item(key);
        }
    }
}

/// Size of the document's client area
pub fn viewport() -> Bounds {
    #[cfg(target_arch = "wasm32")]
    {
        web::viewport()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        Bounds::default()
    }
}

/// Wall-clock milliseconds since the Unix epoch
pub fn now_ms() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        web::now_ms()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}

/// Seed for toy RNGs, derived from the clock
pub fn time_seed() -> u64 {
    now_ms() as u64
}

#[cfg(target_arch = "wasm32")]
pub fn local_storage_get(key: &str) -> Option<String> {
    web::get(true, key)
}

#[cfg(target_arch = "wasm32")]
pub fn local_storage_set(key: &str, value: &str) -> bool {
    web::set(true, key, value)
}

#[cfg(target_arch = "wasm32")]
pub fn session_storage_get(key: &str) -> Option<String> {
    web::get(false, key)
}

#[cfg(target_arch = "wasm32")]
pub fn session_storage_set(key: &str, value: &str) -> bool {
    web::set(false, key, value)
}

#[cfg(target_arch = "wasm32")]
pub fn session_storage_remove(key: &str) {
    web::remove(false, key)
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn local_storage_get(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn local_storage_set(_key: &str, _value: &str) -> bool {
    false
}

#[cfg(not(target_arch = "wasm32"))]
pub fn session_storage_get(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn session_storage_set(_key: &str, _value: &str) -> bool {
    false
}

#[cfg(not(target_arch = "wasm32"))]
pub fn session_storage_remove(_key: &str) {}
