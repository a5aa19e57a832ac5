// Real SWIFT codes in the shapes found in the published registry: headquarters,
// numeric and alphabetic branch codes, and location codes with digits.
pub const VALID_SWIFT_CODES: &[&str] = &[
    "BPKOPLPWXXX",
    "BPKOPLPWGDG",
    "BIGBPLPWCUS",
    "HYVEPLP2XXX",
    "BEFNBGS1XXX",
    "DEUTDEFFXXX",
    "DEUTDEFF500",
    "COBADEFFXXX",
    "BREXPLPWMBK",
    "ALBPPLPWCUS",
    "PKOPPLPWXXX",
    "bpkoplpwxxx",
];
