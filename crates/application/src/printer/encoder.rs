use domain::{Ticket, TicketLayout};

use super::builder::ReceiptBuilder;

/// Timestamp format printed on every ticket
pub const ISSUED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Turns a ticket into the exact byte payload the printer firmware expects
#[derive(Debug, Clone, Default)]
pub struct TicketEncoder {
    layout: TicketLayout,
}

impl TicketEncoder {
    pub fn new(layout: TicketLayout) -> Self {
        Self { layout }
    }

    pub fn encode(&self, ticket: &Ticket) -> Vec<u8> {
        let issued_at = ticket.issued_at.format(ISSUED_AT_FORMAT).to_string();

        ReceiptBuilder::new()
            .initialize()
            .text_line(&self.layout.separator)
            .text_line(&issued_at)
            .text_line(&self.layout.venue)
            .text_line(&format!("Counter {}", ticket.counter_label))
            .text_line(&format!("{} {}", self.layout.number_prefix, ticket.number))
            .text_line(&self.layout.notice)
            .text_line(&self.layout.separator)
            .empty_line()
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_encode_matches_printer_template() {
        let encoder = TicketEncoder::default();
        let bytes = encoder.encode(&Ticket::new("C1", 42, at(9, 5)));

        let mut expected = vec![0x1B, 0x40];
        expected.extend_from_slice(
            b"====================\n\
              2024-01-01 09:05\n\
              KB Carnival Stall 29\n\
              Counter C1\n\
              KB 42\n\
              Please wait within 15 min\n\
              ====================\n\
              \n",
        );
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = TicketEncoder::default();
        let ticket = Ticket::new("C2", 7, at(23, 59));
        assert_eq!(encoder.encode(&ticket), encoder.encode(&ticket));
    }

    #[test]
    fn test_custom_layout() {
        let encoder = TicketEncoder::new(TicketLayout {
            venue: "Stall 30".into(),
            ..TicketLayout::default()
        });
        let bytes = encoder.encode(&Ticket::new("C2", 1, at(12, 0)));
        let text = String::from_utf8(bytes[2..].to_vec()).unwrap();
        assert!(text.contains("\nStall 30\n"));
        assert!(text.contains("\nKB 1\n"));
    }

    #[test]
    fn test_non_ascii_label_is_gbk() {
        let encoder = TicketEncoder::default();
        let bytes = encoder.encode(&Ticket::new("一号", 3, at(8, 0)));
        // 一 = D2 BB, 号 = BA C5
        let needle = [b'r', b' ', 0xD2, 0xBB, 0xBA, 0xC5, b'\n'];
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }
}
