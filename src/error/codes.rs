//! MediaWiki error code table
//!
//! Maps the `error.code` string of a failed mutation to a [`FailureKind`].
//! Each action family has its own table; codes shared by every module
//! (permissions, blocks, read-only mode) fall through to a common table.
//! Anything unrecognized is [`FailureKind::Generic`].

use super::FailureKind;
use crate::types::ActionKind;

/// Classify a remote error code for the given action
pub fn classify(action: ActionKind, code: &str) -> FailureKind {
    let specific = match action {
        ActionKind::Edit | ActionKind::Create => edit(code),
        ActionKind::Move => move_page(code),
        ActionKind::Delete => delete(code),
        ActionKind::Undelete => undelete(code),
        ActionKind::Protect => protect(code),
        ActionKind::Block => block(code),
        ActionKind::Unblock => unblock(code),
        ActionKind::Upload => upload(code),
        ActionKind::Email => email(code),
    };
    specific.or_else(|| common(code)).unwrap_or(FailureKind::Generic)
}

fn common(code: &str) -> Option<FailureKind> {
    match code {
        "permissiondenied" | "badaccess-groups" | "mustbeloggedin" | "writeapidenied"
        | "readapidenied" | "protectednamespace" | "protectednamespace-interface" => {
            Some(FailureKind::Forbidden)
        }
        "blocked" | "autoblocked" | "blockedfrommail" => Some(FailureKind::Blocked),
        "invalidtitle" | "badtitle" | "invalidexpiry" | "pastexpiry" | "invalidreason" => {
            Some(FailureKind::InvalidParameter)
        }
        "missingtitle" | "nosuchuser" => Some(FailureKind::NotFound),
        _ => None,
    }
}

fn edit(code: &str) -> Option<FailureKind> {
    match code {
        "protectedpage" | "protectedtitle" | "cantcreate" | "cantcreate-anon" | "noedit"
        | "noedit-anon" | "cascadeprotected" | "customcssjsprotected" | "customcssprotected"
        | "customjsprotected" | "noimageredirect" | "noimageredirect-anon" => {
            Some(FailureKind::Forbidden)
        }
        "articleexists" => Some(FailureKind::Exists),
        "nocreate" | "nosuchsection" | "nosuchrevid" => Some(FailureKind::NotFound),
        "emptypage" | "emptynewsection" => Some(FailureKind::BlankContent),
        "contenttoobig" | "badmd5" | "badformat" | "missingtext" => {
            Some(FailureKind::InvalidParameter)
        }
        // editconflict and spamdetected stay generic
        _ => None,
    }
}

fn move_page(code: &str) -> Option<FailureKind> {
    match code {
        "cantmove" | "cantmove-anon" | "cantmovefile" | "immobilenamespace" | "protectedpage"
        | "protectedtitle" | "nosuppress" | "filetypemismatch" => Some(FailureKind::Forbidden),
        "selfmove" => Some(FailureKind::AlreadyDone),
        "articleexists" | "redirectexists" => Some(FailureKind::Exists),
        "invalidnewtitle" | "nonfilenamespace" | "sharedfile-exists" => {
            Some(FailureKind::InvalidParameter)
        }
        _ => None,
    }
}

fn delete(code: &str) -> Option<FailureKind> {
    match code {
        "cantdelete" => Some(FailureKind::AlreadyDone),
        "protectedpage" | "bigdelete" => Some(FailureKind::Forbidden),
        _ => None,
    }
}

fn undelete(code: &str) -> Option<FailureKind> {
    match code {
        "cantundelete" => Some(FailureKind::NotFound),
        "undelete-nodeletedrevs" => Some(FailureKind::NotFound),
        _ => None,
    }
}

fn protect(code: &str) -> Option<FailureKind> {
    match code {
        "protect-invalidlevel" | "protect-invalidaction" | "toofewexpiries"
        | "create-titleexists" | "missingtitle-createonly" | "invalid-expiry" => {
            Some(FailureKind::InvalidParameter)
        }
        "cantedit" | "protect-cantedit" => Some(FailureKind::Forbidden),
        _ => None,
    }
}

fn block(code: &str) -> Option<FailureKind> {
    match code {
        "alreadyblocked" => Some(FailureKind::AlreadyDone),
        "invalidip" | "invalidrange" | "range-toobig" => Some(FailureKind::InvalidParameter),
        "cantblock" | "cantblock-email" | "canthide" | "ipb_cant_unblock" => {
            Some(FailureKind::Forbidden)
        }
        _ => None,
    }
}

fn unblock(code: &str) -> Option<FailureKind> {
    match code {
        "cantunblock" => Some(FailureKind::AlreadyDone),
        "blockedasrange" => Some(FailureKind::InvalidParameter),
        "nosuchblockid" => Some(FailureKind::NotFound),
        _ => None,
    }
}

fn upload(code: &str) -> Option<FailureKind> {
    match code {
        "fileexists-no-change" | "duplicate" | "fileexists-forbidden" => {
            Some(FailureKind::AlreadyDone)
        }
        "filetype-banned" | "filetype-missing" | "empty-file" | "illegal-filename"
        | "filename-tooshort" | "invalid-file-key" | "missingparam" | "http-invalid-url"
        | "copyuploadbaddomain" | "copyuploadbadurl" | "verification-error" | "file-too-large" => {
            Some(FailureKind::InvalidParameter)
        }
        "copyuploaddisabled" | "uploaddisabled" | "protectedpage" => {
            Some(FailureKind::Forbidden)
        }
        "http-bad-status" | "http-curl-error" => Some(FailureKind::NotFound),
        _ => None,
    }
}

fn email(code: &str) -> Option<FailureKind> {
    match code {
        "cantsend" | "noemail" | "usermaildisabled" | "noemailtext" | "mailnologin" => {
            Some(FailureKind::Forbidden)
        }
        "blockedfromemailuser" => Some(FailureKind::Blocked),
        "notarget" | "nowikiemail" => Some(FailureKind::NotFound),
        _ => None,
    }
}
