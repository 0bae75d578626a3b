//! Request signing for authenticated Flickr calls.
//!
//! The signature is the MD5 hex digest of the shared secret followed by
//! every parameter name and value, sorted by name, with no separators.

use md5::{Digest, Md5};

/// Computes the `api_sig` value for a parameter set.
#[must_use]
pub fn api_signature(secret: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Md5::new();
    hasher.update(secret.as_bytes());
    for (key, value) in sorted {
        hasher.update(key.as_bytes());
        hasher.update(value.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Appends `api_sig` to `params`, signing everything already present.
pub fn sign_params(secret: &str, params: &mut Vec<(String, String)>) {
    let signature = api_signature(secret, params);
    params.push(("api_sig".to_string(), signature));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_empty_signature_is_md5_of_empty_string() {
        assert_eq!(api_signature("", &[]), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_signature_concatenates_secret_then_pairs() {
        // md5("abc")
        assert_eq!(
            api_signature("a", &pairs(&[("b", "c")])),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_signature_is_order_independent() {
        let forward = pairs(&[("api_key", "k"), ("method", "m"), ("page", "1")]);
        let reversed = pairs(&[("page", "1"), ("method", "m"), ("api_key", "k")]);
        assert_eq!(
            api_signature("secret", &forward),
            api_signature("secret", &reversed)
        );
    }

    #[test]
    fn test_sign_params_appends_api_sig() {
        let mut params = pairs(&[("method", "flickr.test.echo")]);
        sign_params("s", &mut params);
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].0, "api_sig");
        assert_eq!(params[1].1.len(), 32);
    }
}
