/// Round a filter response to the nearest integer and saturate it to `[0, 255]`.
///
/// Halfway cases round away from zero.
///
/// # Example
///
/// ```
/// use pixfilt_imgproc::core::saturate_u8;
///
/// assert_eq!(saturate_u8(-3.0), 0);
/// assert_eq!(saturate_u8(12.5), 13);
/// assert_eq!(saturate_u8(300.0), 255);
/// ```
#[inline]
pub fn saturate_u8(val: f32) -> u8 {
    val.clamp(0.0, 255.0).round() as u8
}
