/// Non-cryptographic quality randomness.
pub struct NonCryptographicRng;

impl NonCryptographicRng {
    #[inline(always)]
    pub fn u16() -> u16 {
        fastrand::u16(..)
    }
}
