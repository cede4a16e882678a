//! Built-in parser, preset and hasher catalog

/// Parser name, description and plugin names
pub(super) const PARSERS: &[(&str, &str, &[&str])] = &[
    ("android_app_usage", "Parser for the Android usage-history.xml file.", &[]),
    ("asl_log", "Parser for ASL log files.", &[]),
    (
        "bencode",
        "Parser for bencoded files.",
        &["bencode_transmission", "bencode_utorrent"],
    ),
    ("binary_cookies", "Parser for Safari Binary Cookie files.", &[]),
    ("bsm_log", "Parser for BSM log files.", &[]),
    ("chrome_cache", "Parser for Chrome Cache files.", &[]),
    ("chrome_preferences", "Parser for Chrome Preferences files.", &[]),
    ("cups_ipp", "Parser for CUPS IPP files.", &[]),
    ("custom_destinations", "Parser for *.customDestinations-ms files.", &[]),
    (
        "esedb",
        "Parser for Extensible Storage Engine (ESE) database files.",
        &["file_history", "msie_webcache"],
    ),
    ("filestat", "Parser for file system stat information.", &[]),
    ("firefox_cache", "Parser for Firefox Cache files.", &[]),
    ("java_idx", "Parser for Java WebStart Cache IDX files.", &[]),
    ("lnk", "Parser for Windows Shortcut (LNK) files.", &[]),
    ("mac_appfirewall_log", "Parser for appfirewall.log files.", &[]),
    ("mac_keychain", "Parser for Mac OS X Keychain files.", &[]),
    ("mac_securityd", "Parser for Mac OS X securityd log files.", &[]),
    ("mcafee_protection", "Parser for McAfee AV Access Protection log files.", &[]),
    ("msiecf", "Parser for MSIE Cache Files (MSIECF) also known as index.dat.", &[]),
    (
        "olecf",
        "Parser for OLE Compound Files (OLECF).",
        &[
            "olecf_automatic_destinations",
            "olecf_default",
            "olecf_document_summary",
            "olecf_summary",
        ],
    ),
    ("opera_global", "Parser for Opera global_history.dat files.", &[]),
    ("opera_typed_history", "Parser for Opera typed_history.xml files.", &[]),
    ("openxml", "Parser for OpenXML (OXML) files.", &[]),
    (
        "plist",
        "Parser for binary and text plist files.",
        &[
            "airport",
            "apple_id",
            "ipod_device",
            "macosx_bluetooth",
            "macuser",
            "plist_default",
            "softwareupdate",
        ],
    ),
    ("pls_recall", "Parser for PL/SQL Recall files.", &[]),
    ("popularity_contest", "Parser for popularity contest log files.", &[]),
    ("prefetch", "Parser for Windows Prefetch files.", &[]),
    ("recycle_bin", "Parser for Windows $Recycle.Bin $I files.", &[]),
    ("recycle_bin_info2", "Parser for Windows Recycler INFO2 files.", &[]),
    ("safari_history", "Parser for Safari history files.", &[]),
    ("selinux", "Parser for SELinux audit log files.", &[]),
    ("skydrive_log", "Parser for OneDrive (or SkyDrive) log files.", &[]),
    ("skydrive_log_error", "Parser for OneDrive (or SkyDrive) error log files.", &[]),
    (
        "sqlite",
        "Parser for SQLite database files.",
        &[
            "android_calls",
            "android_sms",
            "appusage",
            "chrome_cookies",
            "chrome_extension_activity",
            "chrome_history",
            "firefox_cookies",
            "firefox_downloads",
            "firefox_history",
            "google_drive",
            "ls_quarantine",
            "mac_document_versions",
            "mackeeper_cache",
            "skype",
            "zeitgeist",
        ],
    ),
    ("symantec_scanlog", "Parser for Symantec Anti-Virus log files.", &[]),
    ("syslog", "Parser for syslog files.", &[]),
    ("utmp", "Parser for Linux/Unix UTMP files.", &[]),
    ("winevt", "Parser for Windows EventLog (EVT) files.", &[]),
    ("winevtx", "Parser for Windows XML EventLog (EVTX) files.", &[]),
    ("winfirewall", "Parser for Windows Firewall Log files.", &[]),
    ("winjob", "Parser for Windows Scheduled Task job (or At-job) files.", &[]),
    (
        "winreg",
        "Parser for Windows NT Registry (REGF) files.",
        &[
            "ccleaner",
            "userassist",
            "windows_run",
            "windows_services",
            "windows_usb_devices",
            "winreg_default",
        ],
    ),
    ("xchatlog", "Parser for XChat log files.", &[]),
    ("xchatscrollback", "Parser for XChat scrollback log files.", &[]),
];

/// Preset name and members; a member is a preset, parser or `parser/plugin`
pub(super) const PRESETS: &[(&str, &[&str])] = &[
    (
        "android",
        &["android_app_usage", "sqlite/android_calls", "sqlite/android_sms"],
    ),
    (
        "linux",
        &[
            "bencode",
            "filestat",
            "java_idx",
            "olecf",
            "openxml",
            "pls_recall",
            "popularity_contest",
            "selinux",
            "sqlite/google_drive",
            "sqlite/skype",
            "sqlite/zeitgeist",
            "syslog",
            "utmp",
            "webhist",
            "xchatlog",
            "xchatscrollback",
        ],
    ),
    (
        "macosx",
        &[
            "asl_log",
            "bencode",
            "bsm_log",
            "cups_ipp",
            "filestat",
            "java_idx",
            "mac_appfirewall_log",
            "mac_keychain",
            "mac_securityd",
            "olecf",
            "openxml",
            "plist",
            "sqlite/appusage",
            "sqlite/google_drive",
            "sqlite/ls_quarantine",
            "sqlite/mac_document_versions",
            "sqlite/mackeeper_cache",
            "sqlite/skype",
            "utmp",
            "webhist",
        ],
    ),
    (
        "webhist",
        &[
            "binary_cookies",
            "chrome_cache",
            "chrome_preferences",
            "esedb/msie_webcache",
            "firefox_cache",
            "java_idx",
            "msiecf",
            "opera_global",
            "opera_typed_history",
            "safari_history",
            "sqlite/chrome_cookies",
            "sqlite/chrome_extension_activity",
            "sqlite/chrome_history",
            "sqlite/firefox_cookies",
            "sqlite/firefox_downloads",
            "sqlite/firefox_history",
        ],
    ),
    (
        "win7",
        &[
            "custom_destinations",
            "esedb/file_history",
            "olecf/olecf_automatic_destinations",
            "recycle_bin",
            "win_gen",
            "winevtx",
        ],
    ),
    (
        "win_gen",
        &[
            "bencode",
            "esedb",
            "filestat",
            "java_idx",
            "lnk",
            "mcafee_protection",
            "olecf",
            "openxml",
            "prefetch",
            "skydrive_log",
            "skydrive_log_error",
            "sqlite/google_drive",
            "sqlite/skype",
            "symantec_scanlog",
            "webhist",
            "winfirewall",
            "winjob",
            "winreg",
        ],
    ),
    ("winxp", &["recycle_bin_info2", "win_gen", "winevt"]),
];

/// Hasher name and description
pub(super) const HASHERS: &[(&str, &str)] = &[
    ("md5", "Calculates an MD5 digest hash over input data."),
    ("sha256", "Calculates a SHA-256 digest hash over input data."),
];
