//! Freshly minted certificate chains for tests.

use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, KeyPair};

/// A leaf certificate signed by an issuing CA, plus the raw material
/// needed to check derivations independently.
pub struct TestChain {
    pub leaf_pem: String,
    pub leaf_der: Vec<u8>,
    pub leaf_spki: Vec<u8>,
    pub issuer_pem: String,
    pub issuer_der: Vec<u8>,
    pub issuer_spki: Vec<u8>,
}

impl TestChain {
    pub fn generate() -> Self {
        let issuer_key = KeyPair::generate().unwrap();
        let mut issuer_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        issuer_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        issuer_params
            .distinguished_name
            .push(DnType::CommonName, "Test Issuer");
        let issuer = issuer_params.self_signed(&issuer_key).unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let mut leaf_params =
            CertificateParams::new(vec!["www.example.com".to_string()]).unwrap();
        leaf_params
            .distinguished_name
            .push(DnType::CommonName, "www.example.com");
        let leaf = leaf_params.signed_by(&leaf_key, &issuer, &issuer_key).unwrap();

        Self {
            leaf_pem: leaf.pem(),
            leaf_der: leaf.der().to_vec(),
            leaf_spki: leaf_key.public_key_der(),
            issuer_pem: issuer.pem(),
            issuer_der: issuer.der().to_vec(),
            issuer_spki: issuer_key.public_key_der(),
        }
    }

    /// `fullchain.pem` style bundle, leaf first
    pub fn bundle(&self) -> String {
        format!("{}\n{}", self.leaf_pem, self.issuer_pem).replace("\r\n", "\n")
    }
}
