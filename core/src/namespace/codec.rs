//! Value converters used by `save` and `load`.
//!
//! They are passed per call rather than fixed at construction, so the same
//! store can be written out in different textual forms.

use std::fmt::Display;
use std::str::FromStr;


/// Turns a stored value into the text written between quotes.
pub trait Saver<T> {
    fn save(&mut self, value: &T) -> String;
}

/// Turns quoted text from a save file back into a value.
///
/// An `Err` skips the line like any other malformed input.
pub trait Loader<T> {
    fn load(&mut self, text: &str) -> Result<T, String>;
}


impl<T, F: FnMut(&T) -> String> Saver<T> for F {
    fn save(&mut self, value: &T) -> String {
        self(value)
    }
}

impl<T, F: FnMut(&str) -> Result<T, String>> Loader<T> for F {
    fn load(&mut self, text: &str) -> Result<T, String> {
        self(text)
    }
}


/// `Display` out, `FromStr` in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl<T: Display> Saver<T> for TextCodec {
    fn save(&mut self, value: &T) -> String {
        value.to_string()
    }
}

impl<T> Loader<T> for TextCodec
where
    T: FromStr,
    T::Err: Display,
{
    fn load(&mut self, text: &str) -> Result<T, String> {
        text.parse::<T>().map_err(|e| format!("cannot parse '{}': {}", text, e))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_codec_numbers() {
        let mut codec = TextCodec;
        assert_eq!(Saver::<i64>::save(&mut codec, &-12), "-12");
        let v: i64 = codec.load("42").unwrap();
        assert_eq!(v, 42);
        let err = Loader::<i64>::load(&mut codec, "forty").unwrap_err();
        assert!(err.contains("forty"));
    }

    #[test]
    fn closures_are_codecs() {
        let mut saver = |v: &u8| format!("0x{:02x}", v);
        assert_eq!(Saver::save(&mut saver, &255u8), "0xff");

        let mut loader = |s: &str| -> Result<usize, String> { Ok(s.len()) };
        assert_eq!(Loader::load(&mut loader, "abc").unwrap(), 3);
    }
}
