#[cfg(test)]
mod tests {
    use crate::codec::checksum;
    use crate::codec::packet::{Packet, SOM};
    use crate::codec::reader::{PacketReader, ReadStep};

    fn decode_all(bytes: &[u8]) -> Vec<Packet> {
        let mut reader = PacketReader::new();
        let mut out = Vec::new();
        for &b in bytes {
            if let ReadStep::Complete(p) = reader.push(Some(b)) {
                out.push(p);
            }
        }
        out
    }

    #[test]
    fn test_reader_round_trip_preserves_fields() {
        let cases = [
            Packet::new(0x20, 0x12, 0x01, Vec::new()).unwrap(),
            Packet::new(0x20, 0x13, 0x27, vec![0x01]).unwrap(),
            Packet::new(0x12, 0x20, 0x26, vec![0x40, 0x01]).unwrap(),
            Packet::new(0x00, 0xFF, 0x3B, vec![0x3B, 0x3B, 0x3B]).unwrap(),
            Packet::new(0x20, 0x32, 0xFE, vec![0xAA; 252]).unwrap(),
        ];

        for sent in cases {
            let frame = sent.encode();
            let got = decode_all(&frame);
            assert_eq!(got.len(), 1, "frame {:02X?}", frame);

            let got = &got[0];
            assert_eq!(got.source_address(), sent.source_address());
            assert_eq!(got.receiver_address(), sent.receiver_address());
            assert_eq!(got.command(), sent.command());
            assert_eq!(got.data(), sent.data());
            assert_eq!(got.received_checksum(), frame.last().copied());
            assert_eq!(got.is_checksum_ok(), Some(true));
        }
    }

    #[test]
    fn test_encoded_frames_sum_to_zero() {
        for len in [0usize, 1, 3, 17, 252] {
            let data: Vec<u8> = (0..len).map(|i| (i * 37 % 256) as u8).collect();
            let frame = Packet::new(0x20, 0x12, 0x06, data).unwrap().encode();
            assert_eq!(frame[0], SOM);
            assert_eq!(frame.len(), frame[1] as usize + 3);
            assert!(checksum::verify(&frame[1..]));
        }
    }

    #[test]
    fn test_back_to_back_frames() {
        let a = Packet::new(0x20, 0x12, 0x01, Vec::new()).unwrap();
        let b = Packet::new(0x12, 0x20, 0x01, vec![0x00, 0x10, 0x20]).unwrap();
        let mut stream = a.encode();
        stream.extend(b.encode());

        let got = decode_all(&stream);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].data(), a.data());
        assert_eq!(got[1].data(), b.data());
    }

    #[test]
    fn test_false_start_in_noise_recovers() {
        let frame = Packet::new(0x12, 0x20, 0x01, vec![0x05]).unwrap().encode();
        // A stray SOM makes the reader swallow the first real frame as a bogus one
        let mut stream = vec![0x00, SOM, 0x04, 0x99];
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&frame);

        let got = decode_all(&stream);
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].source_address(), 0x99);
        assert_eq!(got[0].is_checksum_ok(), Some(false));
        assert_eq!(got[1].encode(), frame);
        assert_eq!(got[1].is_checksum_ok(), Some(true));
    }

    #[test]
    fn test_noise_on_both_sides() {
        let frame = Packet::new(0x12, 0x20, 0x13, vec![0xFF]).unwrap().encode();
        let mut stream = vec![0x01, 0x02, 0x03, 0xFE];
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&[0x10, 0x20, 0x30]);

        let got = decode_all(&stream);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].encode(), frame);
    }
}
