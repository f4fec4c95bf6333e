use dioxus::prelude::*;

use crate::Route;

struct Section {
    heading: &'static str,
    body: &'static [&'static str],
    items: &'static [&'static str],
}

const SECTIONS: &[Section] = &[
    Section {
        heading: "Overview",
        body: &["This policy describes how the secure notes service collects, uses and handles your personal information."],
        items: &[],
    },
    Section {
        heading: "Information we collect",
        body: &["When you create an account and use the service we collect:"],
        items: &[
            "Account information: username, email address and a hashed password.",
            "Optional information: your full name, if provided.",
            "Content: the notes you create, including titles and content.",
            "Technical information such as IP addresses, browser type and login timestamps.",
        ],
    },
    Section {
        heading: "How we use your information",
        body: &["Your information is used to provide and secure the service, to support you and to detect and fix technical problems."],
        items: &[],
    },
    Section {
        heading: "Security of your data",
        body: &[
            "Notes can be encrypted with a password of your choosing. That password is never stored by this client and is needed to read the note again.",
            "No method of transmission over the internet or of electronic storage is completely secure, so absolute security cannot be guaranteed.",
        ],
        items: &[],
    },
    Section {
        heading: "Sensitivity analysis",
        body: &["The service scores the content of your notes for sensitive information to help you decide when to encrypt. Only the resulting score is kept."],
        items: &[],
    },
    Section {
        heading: "Data retention",
        body: &["Deleting your account permanently deletes your notes and personal information, except where retention is required by law."],
        items: &[],
    },
    Section {
        heading: "Your rights",
        body: &["You may request access to, correction of, erasure of or a portable copy of your personal data, and may object to or restrict its processing."],
        items: &[],
    },
    Section {
        heading: "Contact",
        body: &["Questions about this policy can be sent to support@securenotes.example.com."],
        items: &[],
    },
];

/// Static privacy policy, linked from the registration consent checkbox.
#[component]
pub fn PrivacyPolicy() -> Element {
    rsx! {
        article {
            class: "privacy-policy",
            h1 { "Privacy Policy" }

            for part in SECTIONS {
                section {
                    key: "{part.heading}",
                    h2 { "{part.heading}" }
                    for paragraph in part.body {
                        p { "{paragraph}" }
                    }
                    if !part.items.is_empty() {
                        ul {
                            for item in part.items {
                                li { "{item}" }
                            }
                        }
                    }
                }
            }

            Link { class: "btn", to: Route::Register {}, "Back to registration" }
        }
    }
}
