//! C FFI bindings for compendium-core
//!
//! This crate provides a C-compatible API for use with Qt or other C/C++
//! applications. Collections are passed around as opaque handles; every
//! returned string must be released with `compendium_free_string`.

use compendium_core::{decode_str, encode, reconcile, Category, Entry, ImportPolicy};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Opaque handle to a compendium collection
pub struct FfiCompendium {
    inner: compendium_core::Compendium,
}

/// Merge policy value for `compendium_reconcile`
pub const COMPENDIUM_POLICY_MERGE: c_int = 0;
/// Replace policy value for `compendium_reconcile`
pub const COMPENDIUM_POLICY_REPLACE: c_int = 1;

unsafe fn category_arg(category: *const c_char) -> Option<Category> {
    if category.is_null() {
        return None;
    }
    CStr::from_ptr(category)
        .to_str()
        .ok()
        .and_then(Category::from_key)
}

/// Create an empty compendium
///
/// # Safety
/// - The returned handle must be freed with `compendium_free`
#[no_mangle]
pub unsafe extern "C" fn compendium_new() -> *mut FfiCompendium {
    Box::into_raw(Box::new(FfiCompendium {
        inner: compendium_core::Compendium::new(),
    }))
}

/// Decode an XML document into a compendium
///
/// # Safety
/// - `xml` must be a valid C string
/// - Returns null when the document is not well-formed XML
/// - The returned handle must be freed with `compendium_free`
#[no_mangle]
pub unsafe extern "C" fn compendium_decode(xml: *const c_char) -> *mut FfiCompendium {
    if xml.is_null() {
        return ptr::null_mut();
    }

    let text = match CStr::from_ptr(xml).to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    match decode_str(text) {
        Ok(compendium) => Box::into_raw(Box::new(FfiCompendium { inner: compendium })),
        Err(_) => ptr::null_mut(),
    }
}

/// Encode a compendium as a canonical XML document
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - Caller must free the returned string with `compendium_free_string`
#[no_mangle]
pub unsafe extern "C" fn compendium_encode(compendium: *const FfiCompendium) -> *mut c_char {
    if compendium.is_null() {
        return ptr::null_mut();
    }

    CString::new(encode(&(*compendium).inner))
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Combine `incoming` into `live` under a policy
/// (`COMPENDIUM_POLICY_MERGE` or `COMPENDIUM_POLICY_REPLACE`)
///
/// Returns 0 on success, -1 on a null handle or unknown policy. The
/// incoming handle is not consumed.
///
/// # Safety
/// - `live` and `incoming` must be valid pointers returned by compendium_*
///   functions
#[no_mangle]
pub unsafe extern "C" fn compendium_reconcile(
    live: *mut FfiCompendium,
    incoming: *const FfiCompendium,
    policy: c_int,
) -> c_int {
    if live.is_null() || incoming.is_null() {
        return -1;
    }

    let policy = match policy {
        COMPENDIUM_POLICY_MERGE => ImportPolicy::Merge,
        COMPENDIUM_POLICY_REPLACE => ImportPolicy::Replace,
        _ => return -1,
    };

    reconcile(&mut (*live).inner, (*incoming).inner.clone(), policy);
    0
}

/// Total number of entries across all categories
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
#[no_mangle]
pub unsafe extern "C" fn compendium_total(compendium: *const FfiCompendium) -> usize {
    if compendium.is_null() {
        return 0;
    }
    (*compendium).inner.len()
}

/// Number of entries in one category (plural key, e.g. "monsters")
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - `category` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn compendium_count(
    compendium: *const FfiCompendium,
    category: *const c_char,
) -> usize {
    if compendium.is_null() {
        return 0;
    }

    match category_arg(category) {
        Some(cat) => (*compendium).inner.count(cat),
        None => 0,
    }
}

/// Get an entry name by category and index
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - `category` must be a valid C string
/// - Returns null if the category is unknown or the index is out of bounds
/// - Caller must free the returned string with `compendium_free_string`
#[no_mangle]
pub unsafe extern "C" fn compendium_entry_name(
    compendium: *const FfiCompendium,
    category: *const c_char,
    index: usize,
) -> *mut c_char {
    if compendium.is_null() {
        return ptr::null_mut();
    }

    category_arg(category)
        .and_then(|cat| (*compendium).inner.entry_name(cat, index))
        .and_then(|name| CString::new(name).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Get an entry's display body by category and index
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - `category` must be a valid C string
/// - Returns null if the category is unknown or the index is out of bounds
/// - Caller must free the returned string with `compendium_free_string`
#[no_mangle]
pub unsafe extern "C" fn compendium_entry_text(
    compendium: *const FfiCompendium,
    category: *const c_char,
    index: usize,
) -> *mut c_char {
    if compendium.is_null() {
        return ptr::null_mut();
    }

    category_arg(category)
        .and_then(|cat| (*compendium).inner.entry_text(cat, index))
        .and_then(|text| CString::new(text).ok())
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Add an entry described as category-tagged JSON
///
/// Returns 0 on success, -1 on a null handle or unparseable JSON, -2 when
/// the name is already taken in the entry's category.
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - `json` must be a valid C string
#[no_mangle]
pub unsafe extern "C" fn compendium_add_json(
    compendium: *mut FfiCompendium,
    json: *const c_char,
) -> c_int {
    if compendium.is_null() || json.is_null() {
        return -1;
    }

    let text = match CStr::from_ptr(json).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };

    let entry: Entry = match serde_json::from_str(text) {
        Ok(entry) => entry,
        Err(_) => return -1,
    };

    match (*compendium).inner.add(entry) {
        Ok(()) => 0,
        Err(_) => -2,
    }
}

/// Remove the entry with the exact name from a category
///
/// Returns 1 when an entry was removed, 0 when no entry matched, -1 on a
/// null handle or unknown category.
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_* function
/// - `category` and `name` must be valid C strings
#[no_mangle]
pub unsafe extern "C" fn compendium_remove(
    compendium: *mut FfiCompendium,
    category: *const c_char,
    name: *const c_char,
) -> c_int {
    if compendium.is_null() || name.is_null() {
        return -1;
    }

    let cat = match category_arg(category) {
        Some(cat) => cat,
        None => return -1,
    };
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return -1,
    };

    if (*compendium).inner.remove(cat, name) {
        1
    } else {
        0
    }
}

/// Free a compendium handle
///
/// # Safety
/// - `compendium` must be a valid pointer returned by a compendium_*
///   function or null
#[no_mangle]
pub unsafe extern "C" fn compendium_free(compendium: *mut FfiCompendium) {
    if !compendium.is_null() {
        drop(Box::from_raw(compendium));
    }
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a compendium_* function or null
#[no_mangle]
pub unsafe extern "C" fn compendium_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
