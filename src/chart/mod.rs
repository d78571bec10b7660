//! Chart-of-accounts domain: TT-133 account numbering, kind derivation, and
//! the built-in standard catalog seeded into new tenants.

use serde::{Deserialize, Serialize};

/// Account classification. Stored as text on the account row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
    Other,
}

impl AccountKind {
    pub const ALL: [AccountKind; 6] = [
        AccountKind::Asset,
        AccountKind::Liability,
        AccountKind::Equity,
        AccountKind::Revenue,
        AccountKind::Expense,
        AccountKind::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Asset => "asset",
            AccountKind::Liability => "liability",
            AccountKind::Equity => "equity",
            AccountKind::Revenue => "revenue",
            AccountKind::Expense => "expense",
            AccountKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Derive the kind from the leading digit of a TT-133 code.
    ///
    /// Classes 1-2 are assets, 3 liabilities, 4 equity; 5 and 7 sit on the
    /// revenue side (sales/financial income and other income), 6 and 8 on
    /// the expense side; class 9 is the income summary.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.chars().next()? {
            '1' | '2' => Some(AccountKind::Asset),
            '3' => Some(AccountKind::Liability),
            '4' => Some(AccountKind::Equity),
            '5' | '7' => Some(AccountKind::Revenue),
            '6' | '8' => Some(AccountKind::Expense),
            '9' => Some(AccountKind::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parent linkage by code prefix: `1111` hangs under `111`; three-digit
/// codes are top level.
pub fn parent_code(code: &str) -> Option<&str> {
    if code.len() > 3 {
        Some(&code[..code.len() - 1])
    } else {
        None
    }
}

/// One catalog row for seeding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogAccount {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CatalogAccount {
    /// Resolve the account kind: explicit value wins, else derived from code
    pub fn resolved_kind(&self) -> Option<AccountKind> {
        match self.kind.as_deref() {
            Some(s) => AccountKind::parse(s),
            None => AccountKind::from_code(&self.code),
        }
    }
}

/// Parse a YAML catalog: a list of `{code, name, kind?}` entries
pub fn parse_catalog_yaml(source: &str) -> Result<Vec<CatalogAccount>, serde_yaml::Error> {
    serde_yaml::from_str(source)
}

/// The standard TT-133 account list for small and medium businesses.
/// Codes and names follow circular 133/2016/TT-BTC.
pub fn builtin_catalog() -> Vec<CatalogAccount> {
    const CATALOG: &[(&str, &str)] = &[
        ("111", "Tien mat"),
        ("1111", "Tien Viet Nam"),
        ("1112", "Ngoai te"),
        ("112", "Tien gui ngan hang"),
        ("1121", "Tien Viet Nam"),
        ("1122", "Ngoai te"),
        ("121", "Chung khoan kinh doanh"),
        ("128", "Dau tu nam giu den ngay dao han"),
        ("131", "Phai thu cua khach hang"),
        ("133", "Thue GTGT duoc khau tru"),
        ("1331", "Thue GTGT duoc khau tru cua hang hoa, dich vu"),
        ("1332", "Thue GTGT duoc khau tru cua tai san co dinh"),
        ("136", "Phai thu noi bo"),
        ("138", "Phai thu khac"),
        ("141", "Tam ung"),
        ("151", "Hang mua dang di duong"),
        ("152", "Nguyen lieu, vat lieu"),
        ("153", "Cong cu, dung cu"),
        ("154", "Chi phi san xuat, kinh doanh do dang"),
        ("155", "Thanh pham"),
        ("156", "Hang hoa"),
        ("157", "Hang gui di ban"),
        ("211", "Tai san co dinh"),
        ("2111", "Tai san co dinh huu hinh"),
        ("2112", "Tai san co dinh thue tai chinh"),
        ("2113", "Tai san co dinh vo hinh"),
        ("214", "Hao mon tai san co dinh"),
        ("217", "Bat dong san dau tu"),
        ("229", "Du phong ton that tai san"),
        ("241", "Xay dung co ban do dang"),
        ("242", "Chi phi tra truoc"),
        ("331", "Phai tra cho nguoi ban"),
        ("333", "Thue va cac khoan phai nop Nha nuoc"),
        ("3331", "Thue gia tri gia tang phai nop"),
        ("3334", "Thue thu nhap doanh nghiep"),
        ("3335", "Thue thu nhap ca nhan"),
        ("334", "Phai tra nguoi lao dong"),
        ("335", "Chi phi phai tra"),
        ("338", "Phai tra, phai nop khac"),
        ("341", "Vay va no thue tai chinh"),
        ("411", "Von dau tu cua chu so huu"),
        ("413", "Chenh lech ty gia hoi doai"),
        ("418", "Cac quy thuoc von chu so huu"),
        ("419", "Co phieu quy"),
        ("421", "Loi nhuan sau thue chua phan phoi"),
        ("511", "Doanh thu ban hang va cung cap dich vu"),
        ("5111", "Doanh thu ban hang hoa"),
        ("5112", "Doanh thu ban thanh pham"),
        ("5113", "Doanh thu cung cap dich vu"),
        ("5118", "Doanh thu khac"),
        ("515", "Doanh thu hoat dong tai chinh"),
        ("632", "Gia von hang ban"),
        ("635", "Chi phi tai chinh"),
        ("642", "Chi phi quan ly kinh doanh"),
        ("6421", "Chi phi ban hang"),
        ("6422", "Chi phi quan ly doanh nghiep"),
        ("711", "Thu nhap khac"),
        ("811", "Chi phi khac"),
        ("821", "Chi phi thue thu nhap doanh nghiep"),
        ("911", "Xac dinh ket qua kinh doanh"),
    ];

    CATALOG
        .iter()
        .map(|(code, name)| CatalogAccount {
            code: (*code).to_string(),
            name: (*name).to_string(),
            kind: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_leading_digit() {
        assert_eq!(AccountKind::from_code("111"), Some(AccountKind::Asset));
        assert_eq!(AccountKind::from_code("211"), Some(AccountKind::Asset));
        assert_eq!(AccountKind::from_code("331"), Some(AccountKind::Liability));
        assert_eq!(AccountKind::from_code("411"), Some(AccountKind::Equity));
        assert_eq!(AccountKind::from_code("511"), Some(AccountKind::Revenue));
        assert_eq!(AccountKind::from_code("711"), Some(AccountKind::Revenue));
        assert_eq!(AccountKind::from_code("642"), Some(AccountKind::Expense));
        assert_eq!(AccountKind::from_code("811"), Some(AccountKind::Expense));
        assert_eq!(AccountKind::from_code("911"), Some(AccountKind::Other));
        assert_eq!(AccountKind::from_code(""), None);
    }

    #[test]
    fn parent_by_prefix() {
        assert_eq!(parent_code("1111"), Some("111"));
        assert_eq!(parent_code("6421"), Some("642"));
        assert_eq!(parent_code("111"), None);
    }

    #[test]
    fn builtin_catalog_is_wellformed() {
        let catalog = builtin_catalog();
        assert!(catalog.len() > 50);

        let mut seen = std::collections::HashSet::new();
        for entry in &catalog {
            assert!(crate::validate::account_code(&entry.code).is_ok(), "{}", entry.code);
            assert!(entry.resolved_kind().is_some(), "{}", entry.code);
            assert!(seen.insert(entry.code.clone()), "duplicate {}", entry.code);

            // every non-top-level code has its parent in the catalog
            if let Some(parent) = parent_code(&entry.code) {
                assert!(
                    catalog.iter().any(|e| e.code == parent),
                    "missing parent {} for {}",
                    parent,
                    entry.code
                );
            }
        }
    }

    #[test]
    fn yaml_catalog_parses() {
        let yaml = r#"
- code: "111"
  name: Tien mat
- code: "9999"
  name: Tai khoan noi bo
  kind: other
"#;
        let parsed = parse_catalog_yaml(yaml).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].resolved_kind(), Some(AccountKind::Asset));
        assert_eq!(parsed[1].resolved_kind(), Some(AccountKind::Other));
    }
}
