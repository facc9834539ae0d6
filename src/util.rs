use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub fn setup_logging(log_level: &str) {
    let level: Directive = log_level
        .parse()
        .unwrap_or_else(|_| Level::INFO.into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(
            EnvFilter::from_default_env()
                .add_directive(level)
                .add_directive("hyper=info".parse().unwrap())
                .add_directive("tower_http=info".parse().unwrap()),
        )
        .try_init()
        .expect("Failed to initialize logging");
}

/// Parses the leading integer of `token` the way loose command operands are
/// read: `"90.7"` gives 90, `"-15deg"` gives -15, anything without a leading
/// digit gives `None`. Digit runs past the `i64` range saturate.
pub fn parse_leading_int(token: &str) -> Option<i64> {
    let token = token.trim_start();
    let negative = token.starts_with('-');
    let digits_start = usize::from(token.starts_with(['-', '+']));
    let digits_len = token[digits_start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits_len == 0 {
        return None;
    }
    let value = token[..digits_start + digits_len]
        .parse()
        .unwrap_or(if negative { i64::MIN } else { i64::MAX });
    Some(value)
}

/// Parses a whole token as a number, yielding NaN when it is not one.
///
/// Only decimal notation and a spelled-out `Infinity` are numbers; `inf` and
/// `nan` are not.
pub fn parse_number(token: &str) -> f64 {
    let token = token.trim();
    if token.is_empty() {
        return 0.0;
    }
    let magnitude = token.strip_prefix(['-', '+']).unwrap_or(token);
    if magnitude == "Infinity" {
        return token.replace("Infinity", "inf").parse().unwrap_or(f64::NAN);
    }
    if magnitude.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    token.parse().unwrap_or(f64::NAN)
}
