use crate::helpers::time::now_i64;

/// An issued access token, already rendered as an `Authorization` header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub exp_unix_ts: i64, // UNIX TIMESTAMP
}

impl Token {
    pub fn new(value: String, exp_unix_ts: i64) -> Self {
        Self { value, exp_unix_ts }
    }

    /// True once the token is within `safety_margin_seconds` of expiring.
    pub fn should_update(&self, safety_margin_seconds: i64) -> bool {
        now_i64() >= self.exp_unix_ts.saturating_sub(safety_margin_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_update_honours_safety_margin() {
        let now = now_i64();
        let token = Token::new("Authorization: Bearer a".into(), now + 3600);
        assert!(!token.should_update(300));
        assert!(token.should_update(3600));

        let expired = Token::new("Authorization: Bearer b".into(), now - 1);
        assert!(expired.should_update(0));
    }
}
