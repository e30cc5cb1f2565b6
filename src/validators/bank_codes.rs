/// Leading-pair BSB bank codes from the public APCA/BECS number-range
/// allocations. A BSB's first two digits identify the issuing institution;
/// the remaining four identify state and branch and are not validated here.
pub const BSB_BANK_CODES: &[(&str, &str)] = &[
    ("01", "ANZ"),
    ("03", "Westpac"),
    ("06", "Commonwealth Bank"),
    ("08", "National Australia Bank"),
    ("09", "Reserve Bank of Australia"),
    ("10", "BankSA"),
    ("11", "St George Bank"),
    ("12", "Bank of Queensland"),
    ("14", "Rabobank Australia"),
    ("15", "Town & Country Bank"),
    ("18", "Macquarie Bank"),
    ("19", "Bank of Melbourne"),
    ("21", "JPMorgan Chase Bank"),
    ("22", "BNP Paribas"),
    ("23", "Bank of America"),
    ("24", "Citibank"),
    ("25", "BNP Paribas Securities"),
    ("26", "Bankers Trust Australia"),
    ("29", "Bank of Tokyo-Mitsubishi"),
    ("30", "Bankwest"),
    ("33", "St George Bank (Advance)"),
    ("34", "HSBC Bank Australia"),
    ("35", "Bank of China"),
    ("40", "Commonwealth Development Bank"),
    ("41", "Deutsche Bank"),
    ("45", "OCBC Bank"),
    ("47", "Challenge Bank"),
    ("48", "Suncorp-Metway"),
    ("52", "Trust Bank of Tasmania"),
    ("57", "Australian Settlements"),
    ("61", "Adelaide Bank"),
    ("63", "Bendigo and Adelaide Bank"),
    ("70", "Indue"),
    ("73", "Westpac"),
    ("76", "Commonwealth Bank"),
    ("78", "National Australia Bank"),
    ("80", "Cuscal"),
    ("92", "ING Bank Australia"),
    ("93", "AMP Bank"),
    ("94", "ME Bank"),
];

/// Look up the institution behind a BSB's leading digit pair.
pub fn institution_for_prefix(prefix: &str) -> Option<&'static str> {
    BSB_BANK_CODES
        .iter()
        .find(|(code, _)| *code == prefix)
        .map(|(_, name)| *name)
}
