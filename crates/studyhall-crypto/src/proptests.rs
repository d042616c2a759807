#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::codec::{decrypt_from_peer, encrypt_for_peer};
    use crate::envelope::NONCE_LEN;
    use crate::error::HexError;
    use crate::hex::{bytes_to_hex, hex_to_bytes};
    use crate::keys::{KeyPair, SecretKey};
    use crate::peer_box::PeerBox;

    fn pair_from_seed(seed: [u8; 32]) -> KeyPair {
        KeyPair::from_secret(SecretKey::from_bytes(seed))
    }

    proptest! {
        // Round trip for arbitrary text and arbitrary key pairs
        #[test]
        fn test_round_trip(
            text in any::<String>(),
            a_seed in any::<[u8; 32]>(),
            b_seed in any::<[u8; 32]>()
        ) {
            let a = pair_from_seed(a_seed).to_hex();
            let b = pair_from_seed(b_seed).to_hex();

            let msg = encrypt_for_peer(&text, &b.public_key, &a.private_key).unwrap();
            let out = decrypt_from_peer(&msg.ciphertext, &a.public_key, &b.private_key).unwrap();
            prop_assert_eq!(out, text);
        }

        // Any single bit flip past the nonce is caught
        #[test]
        fn test_bit_flip_detected(
            text in ".{0,64}",
            byte in any::<prop::sample::Index>(),
            bit in 0u8..8
        ) {
            let a = KeyPair::generate().unwrap().to_hex();
            let b = KeyPair::generate().unwrap().to_hex();
            let msg = encrypt_for_peer(&text, &b.public_key, &a.private_key).unwrap();

            let mut raw = hex_to_bytes(&msg.ciphertext).unwrap();
            let i = NONCE_LEN + byte.index(raw.len() - NONCE_LEN);
            raw[i] ^= 1 << bit;

            let res = decrypt_from_peer(&bytes_to_hex(&raw), &a.public_key, &b.private_key);
            prop_assert!(res.unwrap_err().is_decryption_failure());
        }

        // Opening with an unrelated secret fails
        #[test]
        fn test_wrong_recipient_rejected(
            payload in any::<Vec<u8>>(),
            a_seed in any::<[u8; 32]>(),
            b_seed in any::<[u8; 32]>(),
            c_seed in any::<[u8; 32]>()
        ) {
            let a = pair_from_seed(a_seed);
            let b = pair_from_seed(b_seed);
            let c = pair_from_seed(c_seed);
            prop_assume!(b.public_key() != c.public_key());

            let env = PeerBox::new(a.secret_key(), b.public_key()).unwrap().seal(&payload).unwrap();
            let eve = PeerBox::new(c.secret_key(), a.public_key()).unwrap();
            prop_assert!(eve.open(&env).is_err());
        }

        // Two seals of the same plaintext never share a nonce
        #[test]
        fn test_nonce_uniqueness(payload in any::<Vec<u8>>()) {
            let a = KeyPair::generate().unwrap();
            let b = KeyPair::generate().unwrap();
            let pb = PeerBox::new(a.secret_key(), b.public_key()).unwrap();
            let e1 = pb.seal(&payload).unwrap();
            let e2 = pb.seal(&payload).unwrap();
            prop_assert_ne!(e1.nonce, e2.nonce);
            prop_assert_ne!(e1.to_hex(), e2.to_hex());
        }

        // Well-formed lowercase hex survives decode/encode unchanged
        #[test]
        fn test_hex_round_trip(bytes in any::<Vec<u8>>()) {
            let s = bytes_to_hex(&bytes);
            prop_assert_eq!(bytes_to_hex(&hex_to_bytes(&s).unwrap()), s);
        }

        // Odd-length input is refused rather than truncated
        #[test]
        fn test_odd_hex_rejected(s in "[0-9a-f]([0-9a-f]{2}){0,31}") {
            prop_assert_eq!(hex_to_bytes(&s), Err(HexError::OddLength(s.len())));
        }
    }
}
