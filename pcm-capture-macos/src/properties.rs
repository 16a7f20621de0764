//! Typed reads of Core Audio object properties.

use std::ffi::{c_char, c_void, CStr};
use std::mem;
use std::ptr;

use core_foundation_sys::base::{CFRelease, CFTypeRef};
use core_foundation_sys::string::{
    kCFStringEncodingUTF8, CFStringGetCString, CFStringGetLength, CFStringGetMaximumSizeForEncoding,
    CFStringRef,
};
use coreaudio_sys::{AudioObjectGetPropertyData, AudioObjectID, AudioObjectPropertyAddress};

use pcm_capture_core::CaptureError;

/// `kAudioObjectPropertyElementMain` (formerly `...ElementMaster`).
pub const ELEMENT_MAIN: u32 = 0;

/// Fixed buffer size for C-string device properties.
const NAME_BUFFER_LEN: usize = 64;

pub fn address(selector: u32, scope: u32) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: ELEMENT_MAIN,
    }
}

/// Read a fixed-size property value.
///
/// # Safety
/// `T` must be the exact type Core Audio writes for `selector`, and an
/// all-zero `T` must be a valid value.
pub unsafe fn read<T: Copy>(
    object: AudioObjectID,
    selector: u32,
    scope: u32,
    property: &'static str,
) -> Result<T, CaptureError> {
    let address = address(selector, scope);
    let mut value: T = mem::zeroed();
    let mut size = mem::size_of::<T>() as u32;

    let status = AudioObjectGetPropertyData(
        object,
        &address,
        0,
        ptr::null(),
        &mut size,
        &mut value as *mut T as *mut c_void,
    );
    if status != 0 {
        return Err(CaptureError::PropertyQuery { property, status });
    }
    Ok(value)
}

/// Read a property delivered as a NUL-terminated C string.
pub fn read_c_string(
    object: AudioObjectID,
    selector: u32,
    property: &'static str,
) -> Result<String, CaptureError> {
    // SAFETY: name-style properties are written as at most NAME_BUFFER_LEN bytes.
    let bytes: [u8; NAME_BUFFER_LEN] = unsafe {
        read(object, selector, coreaudio_sys::kAudioObjectPropertyScopeGlobal as u32, property)?
    };
    Ok(c_bytes_to_string(&bytes))
}

/// Read a property delivered as an owned `CFStringRef`.
pub fn read_cf_string(
    object: AudioObjectID,
    selector: u32,
    property: &'static str,
) -> Result<String, CaptureError> {
    // SAFETY: CFString properties are written as a single pointer; zero is null.
    let raw: *const c_void = unsafe {
        read(object, selector, coreaudio_sys::kAudioObjectPropertyScopeGlobal as u32, property)?
    };
    if raw.is_null() {
        return Err(CaptureError::PropertyQuery { property, status: 0 });
    }

    let string = raw as CFStringRef;
    // SAFETY: the property getter hands over a +1 reference that we release.
    let converted = unsafe {
        let converted = cf_string_to_string(string);
        CFRelease(string as CFTypeRef);
        converted
    };
    converted.ok_or(CaptureError::PropertyQuery { property, status: 0 })
}

/// Copy a CFString out as UTF-8.
///
/// # Safety
/// `string` must be a valid, non-null `CFStringRef`.
pub unsafe fn cf_string_to_string(string: CFStringRef) -> Option<String> {
    let length = CFStringGetLength(string);
    let capacity = CFStringGetMaximumSizeForEncoding(length, kCFStringEncodingUTF8) + 1;
    let mut buffer = vec![0u8; capacity as usize];

    if CFStringGetCString(
        string,
        buffer.as_mut_ptr() as *mut c_char,
        capacity,
        kCFStringEncodingUTF8,
    ) == 0
    {
        return None;
    }
    Some(c_bytes_to_string(&buffer))
}

/// Text up to the first NUL byte (or the whole slice), lossily decoded.
pub fn c_bytes_to_string(bytes: &[u8]) -> String {
    match CStr::from_bytes_until_nul(bytes) {
        Ok(c_str) => c_str.to_string_lossy().into_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
