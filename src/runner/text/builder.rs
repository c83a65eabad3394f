use crate::runner::ds::string::JsString;
use crate::runner::text::utf::push_code_point;

/// Growable buffer of UTF-16 code units that freezes into a `JsString`.
#[derive(Default)]
pub struct StringBuilder {
    units: Vec<u16>,
}

impl StringBuilder {
    pub fn new() -> Self {
        StringBuilder { units: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        StringBuilder {
            units: Vec::with_capacity(capacity),
        }
    }

    pub fn push_str(&mut self, s: &str) -> &mut Self {
        self.units.extend(s.encode_utf16());
        self
    }

    pub fn push_char(&mut self, c: char) -> &mut Self {
        push_code_point(&mut self.units, c as u32);
        self
    }

    pub fn push_unit(&mut self, u: u16) -> &mut Self {
        self.units.push(u);
        self
    }

    pub fn push_units(&mut self, units: &[u16]) -> &mut Self {
        self.units.extend_from_slice(units);
        self
    }

    pub fn push_js(&mut self, s: &JsString) -> &mut Self {
        self.units.extend_from_slice(s.units());
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn build(self) -> JsString {
        JsString::from_units(self.units)
    }
}
