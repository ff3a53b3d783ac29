/// Lookup-source name constants so log lines, rate-limit keys, and
/// outcome details all agree on spelling.
pub const EMAIL_VALIDATION_SOURCE: &str = "email_validation";
pub const WHOIS_SOURCE: &str = "whois";
pub const COMPANY_DIRECTORY_SOURCE: &str = "company_directory";
pub const LOCAL_BUSINESS_SOURCE: &str = "local_business";
pub const WEB_SCRAPER_SOURCE: &str = "web_scraper";

/// Upload extensions the ingestion layer accepts as delimited text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Spreadsheet extensions we recognize but refuse, with a pointer to
/// re-export as CSV instead.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// Consumer mail hosts that say nothing about the contact's company, so
/// they are skipped when deriving a company domain from an email address.
pub const FREE_MAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "live.com",
    "msn.com",
    "protonmail.com",
];
