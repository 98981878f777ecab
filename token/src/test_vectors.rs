//! EC_v1 key derivation test vectors
//!
//! Shared secrets and derived keys below were computed independently of
//! this crate and must be reproduced byte for byte.

#[cfg(test)]
mod kdf_test_vectors {
    use crate::crypto::{
        generate_shared_secret, generate_symmetric_key, MerchantPrivateKey, SharedSecret,
    };
    use crate::merchant::{extract_merchant_id, MerchantCertificate, MerchantId};
    use crate::token::PaymentToken;
    use base64::{engine::general_purpose::STANDARD, Engine};

    const CERTIFICATE_PEM: &str = include_str!("../fixtures/certificate.pem");
    const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/private_key.pem");
    const TOKEN_JSON: &str = include_str!("../fixtures/token.json");
    const TOKEN_APPLICATION_DATA_JSON: &str =
        include_str!("../fixtures/token_application_data.json");

    fn shared_secret(b64: &str) -> SharedSecret {
        let bytes: [u8; 32] = STANDARD.decode(b64).unwrap().try_into().unwrap();
        SharedSecret::from_bytes(bytes)
    }

    fn derive_b64(merchant_id: &str, secret_b64: &str) -> String {
        let key = generate_symmetric_key(&MerchantId::new(merchant_id), &shared_secret(secret_b64))
            .unwrap();
        STANDARD.encode(key.as_bytes())
    }

    /// Canonical regression vector for the single-step KDF
    #[test]
    fn test_vector_1_canonical_kdf() {
        assert_eq!(
            derive_b64(
                "358DA5890B9555C0A9EFB84B5CD6FF04BFDCD5AABF5DC14B9872D8DF51EAF439",
                "yCUzDuNYTnUnANZEdxC7+DvPmqNslB2YWYn68SBsJHU=",
            ),
            "3GTXJ4RuP/IhS23hsdOw2J2ecAZmC0RasbPIFdC3nQM="
        );
    }

    #[test]
    fn test_vector_2_second_merchant() {
        assert_eq!(
            derive_b64(
                "F938F4658CA2C1C9C38B8DFCB5DBB2A2245607DDE2F114620E8468EF52D208CA",
                "a2pPfemSdA560FnzLSv8zfdlWdGJTonApOLq1zfgx8w=",
            ),
            "HOSago9Z1DhhukQvzmgpuCGPuwq1W0AgasMQWNZvUIY="
        );
    }

    /// Hex case of the merchant id does not change the derived key
    #[test]
    fn test_vector_merchant_id_case_insensitive() {
        let upper = "358DA5890B9555C0A9EFB84B5CD6FF04BFDCD5AABF5DC14B9872D8DF51EAF439";
        let secret = "yCUzDuNYTnUnANZEdxC7+DvPmqNslB2YWYn68SBsJHU=";
        assert_eq!(derive_b64(upper, secret), derive_b64(&upper.to_lowercase(), secret));
    }

    /// Fixture token: ECDH output and derived key
    #[test]
    fn test_vector_3_fixture_token() {
        let key = MerchantPrivateKey::from_pem_or_der(PRIVATE_KEY_PEM.as_bytes()).unwrap();
        let cert = MerchantCertificate::from_pem_or_der(CERTIFICATE_PEM.as_bytes()).unwrap();

        let cases = [
            (
                TOKEN_JSON,
                "IblXzqLd0MRjZZpO/XNN/CtuQ0RfJve3ciWcOZECXog=",
                "fqWAyOAVAGAdzv9PGaNIdxUKUnKHLvwjRXKmbVcB/aU=",
            ),
            (
                TOKEN_APPLICATION_DATA_JSON,
                "xKMV6tOQU9W1wdBBSzyHg0EjuJnn0M+4lDFGG/RO7vU=",
                "swIPxsbCD80+dMJoZjqstuaGXXYldvK7hqNaovNFAZM=",
            ),
        ];

        for (json, expected_secret, expected_key) in cases {
            let envelope = PaymentToken::from_json(json).unwrap().decode().unwrap();

            let secret = generate_shared_secret(&key, envelope.ephemeral_public_key()).unwrap();
            assert_eq!(STANDARD.encode(secret.as_bytes()), expected_secret);

            let merchant_id = extract_merchant_id(&cert).unwrap();
            let symmetric = generate_symmetric_key(&merchant_id, &secret).unwrap();
            assert_eq!(STANDARD.encode(symmetric.as_bytes()), expected_key);
        }
    }

    #[test]
    fn test_vector_bad_merchant_id_hex() {
        let result = generate_symmetric_key(
            &MerchantId::new("358DA5890B9555C0A9EFB84B5CD6FF04BFDCD5AABF5DC14B9872D8DF51EAF43"),
            &shared_secret("yCUzDuNYTnUnANZEdxC7+DvPmqNslB2YWYn68SBsJHU="),
        );
        assert!(matches!(
            result,
            Err(crate::error::TokenError::MalformedInput { field: "merchant id", .. })
        ));
    }
}
