use encoding_rs::GBK;

/// ESC/POS byte buffer. Text is emitted in GBK, the code page the
/// stall's thermal printers default to.
pub struct ReceiptBuilder {
    buffer: Vec<u8>,
}

impl ReceiptBuilder {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn initialize(mut self) -> Self {
        // ESC @: Initialize printer
        self.buffer.extend_from_slice(&[0x1B, 0x40]);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        encode_gbk(text, &mut self.buffer);
        self
    }

    pub fn text_line(self, text: &str) -> Self {
        let mut builder = self.text(text);
        builder.buffer.push(0x0A); // LF
        builder
    }

    pub fn empty_line(mut self) -> Self {
        self.buffer.push(0x0A);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.buffer
    }
}

impl Default for ReceiptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Characters GBK cannot represent become `?`
fn encode_gbk(text: &str, out: &mut Vec<u8>) {
    let (bytes, _, had_errors) = GBK.encode(text);
    if !had_errors {
        out.extend_from_slice(&bytes);
        return;
    }

    let mut scratch = [0u8; 4];
    for c in text.chars() {
        let (bytes, _, unmappable) = GBK.encode(c.encode_utf8(&mut scratch));
        if unmappable {
            out.push(b'?');
        } else {
            out.extend_from_slice(&bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passes_through() {
        let bytes = ReceiptBuilder::new().text_line("KB 7").build();
        assert_eq!(bytes, b"KB 7\n");
    }

    #[test]
    fn test_chinese_is_gbk() {
        let bytes = ReceiptBuilder::new().text("号").build();
        assert_eq!(bytes, vec![0xBA, 0xC5]);
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let bytes = ReceiptBuilder::new().text("A\u{1F600}B").build();
        assert_eq!(bytes, b"A?B");
    }

    #[test]
    fn test_initialize_prefix() {
        let bytes = ReceiptBuilder::new().initialize().empty_line().build();
        assert_eq!(bytes, vec![0x1B, 0x40, 0x0A]);
    }
}
