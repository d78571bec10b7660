//! Shared input validators for registration, onboarding, and business data.
//!
//! Validators return `Result<(), String>` with a client-facing message so
//! handlers can map failures onto per-field validation errors.

/// Validate email format
pub fn email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long".to_string());
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err("Invalid email format".to_string());
    }

    if !parts[1].contains('.') || parts[1].starts_with('.') || parts[1].ends_with('.') {
        return Err("Invalid email domain".to_string());
    }

    if email.chars().any(|c| c.is_whitespace()) {
        return Err("Email cannot contain whitespace".to_string());
    }

    Ok(())
}

/// Validate password strength for registration
pub fn password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if password.len() > 128 {
        return Err("Password must be less than 128 characters".to_string());
    }
    Ok(())
}

/// Validate a tenant slug (URL-safe identifier derived from the company name)
pub fn tenant_slug(name: &str) -> Result<(), String> {
    if name.len() < 2 {
        return Err("Tenant name must be at least 2 characters".to_string());
    }

    if name.len() > 100 {
        return Err("Tenant name must be less than 100 characters".to_string());
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(
            "Tenant name can only contain letters, numbers, hyphens, and underscores".to_string(),
        );
    }

    if !name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err("Tenant name must start with a letter or number".to_string());
    }

    Ok(())
}

/// Validate a Vietnamese enterprise tax code (ma so thue).
///
/// Accepted forms: `NNNNNNNNNN` (10 digits) or `NNNNNNNNNN-NNN` (branch
/// suffix). The tenth digit is a check digit over the first nine with
/// weights 31, 29, 23, 19, 17, 13, 7, 5, 3: it must equal
/// `10 - (weighted sum mod 11)`, and a result of 10 is never valid.
pub fn tax_code(code: &str) -> Result<(), String> {
    let (base, branch) = match code.split_once('-') {
        Some((base, branch)) => (base, Some(branch)),
        None => (code, None),
    };

    if base.len() != 10 || !base.chars().all(|c| c.is_ascii_digit()) {
        return Err("Tax code must be 10 digits, optionally followed by -NNN".to_string());
    }

    if let Some(branch) = branch {
        if branch.len() != 3 || !branch.chars().all(|c| c.is_ascii_digit()) {
            return Err("Tax code branch suffix must be exactly 3 digits".to_string());
        }
    }

    const WEIGHTS: [u32; 9] = [31, 29, 23, 19, 17, 13, 7, 5, 3];
    let digits: Vec<u32> = base.chars().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits[..9].iter().zip(WEIGHTS).map(|(d, w)| d * w).sum();
    let check = 10 - (sum % 11);

    if check == 10 || check != digits[9] {
        return Err("Tax code check digit is invalid".to_string());
    }

    Ok(())
}

/// Validate an account code per the TT-133 numbering convention:
/// all digits, 3 to 7 characters, never starting with 0.
pub fn account_code(code: &str) -> Result<(), String> {
    if code.len() < 3 || code.len() > 7 {
        return Err("Account code must be between 3 and 7 digits".to_string());
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err("Account code must contain only digits".to_string());
    }

    if code.starts_with('0') {
        return Err("Account code cannot start with 0".to_string());
    }

    Ok(())
}

/// Validate a partner or product reference code
pub fn entity_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Code cannot be empty".to_string());
    }

    if code.len() > 30 {
        return Err("Code must be at most 30 characters".to_string());
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.') {
        return Err("Code can only contain letters, numbers, '-', '_' and '.'".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_emails() {
        assert!(email("ke.toan@congty.vn").is_ok());
        assert!(email("a@b.co").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(email("").is_err());
        assert!(email("no-at-sign").is_err());
        assert!(email("two@@signs.vn").is_err());
        assert!(email("a@nodot").is_err());
        assert!(email("spaced out@x.vn").is_err());
    }

    #[test]
    fn tax_code_check_digit() {
        // 0*31 + 1*29 + 0 + 0 + 1*17 + 0 + 9*7 + 4*5 + 2*3 = 135; 135 % 11 = 3; check = 7
        assert!(tax_code("0100109427").is_ok());
        assert!(tax_code("0100109427-001").is_ok());

        // wrong check digit
        assert!(tax_code("0100109421").is_err());
        // malformed
        assert!(tax_code("010010942").is_err());
        assert!(tax_code("0100109427-1").is_err());
        assert!(tax_code("01001O9427").is_err());
    }

    #[test]
    fn account_codes() {
        assert!(account_code("111").is_ok());
        assert!(account_code("1111").is_ok());
        assert!(account_code("6421").is_ok());
        assert!(account_code("11").is_err());
        assert!(account_code("0111").is_err());
        assert!(account_code("11a1").is_err());
        assert!(account_code("11111111").is_err());
    }

    #[test]
    fn tenant_slugs() {
        assert!(tenant_slug("cong-ty-abc").is_ok());
        assert!(tenant_slug("a").is_err());
        assert!(tenant_slug("-leading").is_err());
        assert!(tenant_slug("has space").is_err());
    }

    #[test]
    fn entity_codes() {
        assert!(entity_code("KH-0001").is_ok());
        assert!(entity_code("SP.01_A").is_ok());
        assert!(entity_code("").is_err());
        assert!(entity_code("bad code").is_err());
    }
}
