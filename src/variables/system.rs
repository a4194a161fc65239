//! System variables.
//!
//! This module implements the `$`-prefixed generators such as `{{$uuid}}`,
//! `{{$timestamp}}`, `{{$randomInt 1 100}}`, `{{$datetime iso8601}}`,
//! `{{$processEnv HOME}}` and `{{$dotenv API_KEY}}`.
//!
//! Generators live in a read-only [`GeneratorCatalog`] built once per
//! process. Each entry owns an anchored pattern describing its argument
//! grammar; a directive that matches no pattern, or whose arguments fail to
//! parse, evaluates to `None` and the caller leaves the placeholder as
//! written.

use super::environment::ProcessEnv;
use chrono::{DateTime, Duration, Local, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use rand::distributions::{Alphanumeric, Uniform};
use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};
use std::collections::HashMap;
use uuid::Uuid;

/// Longest string the random string generators will produce.
pub const MAX_RANDOM_LENGTH: usize = 4096;

const DEFAULT_STRING_LENGTH: usize = 10;
const DEFAULT_HEX_LENGTH: usize = 16;
const DEFAULT_PASSWORD_LENGTH: usize = 16;

/// Keys of the generators computed once per request.
pub const PREGENERATED_KEYS: &[&str] = &["$uuid", "$guid", "$timestamp", "$randomInt"];

const WORDS: &[&str] = &[
    "alpha", "bravo", "cedar", "delta", "ember", "falcon", "garnet", "harbor", "indigo", "juniper",
    "kestrel", "lantern", "meadow", "nimbus", "orchid", "pepper", "quartz", "raven", "saffron",
    "timber", "umber", "velvet", "willow", "xenon", "yonder", "zephyr",
];

const TOP_LEVEL_DOMAINS: &[&str] = &["com", "net", "org", "io", "dev", "example"];

const PASSWORD_SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}";
const STRING_SYMBOLS: &[u8] = b"-_.~";
const ALPHABETIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Inputs a generator may read besides its arguments.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub process_env: &'a dyn ProcessEnv,
    pub dotenv: &'a HashMap<String, String>,
}

type Handler = fn(&Captures<'_>, &GeneratorContext<'_>) -> Option<String>;

/// One catalog entry.
pub struct SystemVariable {
    name: &'static str,
    pattern: Regex,
    handler: Handler,
}

impl SystemVariable {
    fn new(name: &'static str, pattern: &str, handler: Handler) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("system variable pattern must compile"),
            handler,
        }
    }
}

impl std::fmt::Debug for SystemVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemVariable")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// The table of system-variable generators.
#[derive(Debug)]
pub struct GeneratorCatalog {
    entries: Vec<SystemVariable>,
}

static CATALOG: Lazy<GeneratorCatalog> = Lazy::new(GeneratorCatalog::build);

impl GeneratorCatalog {
    /// The process-wide catalog.
    pub fn shared() -> &'static GeneratorCatalog {
        &CATALOG
    }

    fn build() -> Self {
        let entries = vec![
            SystemVariable::new("uuid", r"^\$(?:uuid|guid)$", |_, _| Some(generate_uuid())),
            SystemVariable::new(
                "randomInt",
                r"^\$randomInt(?:\s+(\S+)\s+(\S+))?$",
                random_int,
            ),
            SystemVariable::new(
                "randomFloat",
                r"^\$randomFloat(?:\s+(\S+)\s+(\S+))?$",
                random_float,
            ),
            SystemVariable::new("randomHex", r"^\$randomHex(?:\s+(\S+))?$", |caps, _| {
                let len = optional_length(caps, DEFAULT_HEX_LENGTH)?;
                Some(random_from(b"0123456789abcdef", len))
            }),
            SystemVariable::new(
                "randomAlphabetic",
                r"^\$randomAlphabetic(?:\s+(\S+))?$",
                |caps, _| {
                    let len = optional_length(caps, DEFAULT_STRING_LENGTH)?;
                    Some(random_from(ALPHABETIC, len))
                },
            ),
            SystemVariable::new(
                "randomAlphanumeric",
                r"^\$randomAlphanumeric(?:\s+(\S+))?$",
                |caps, _| {
                    let len = optional_length(caps, DEFAULT_STRING_LENGTH)?;
                    Some(
                        rand::thread_rng()
                            .sample_iter(&Alphanumeric)
                            .take(len)
                            .map(char::from)
                            .collect(),
                    )
                },
            ),
            SystemVariable::new("randomString", r"^\$randomString(?:\s+(\S+))?$", |caps, _| {
                let len = optional_length(caps, DEFAULT_STRING_LENGTH)?;
                let charset: Vec<u8> = ALPHABETIC
                    .iter()
                    .chain(b"0123456789")
                    .chain(STRING_SYMBOLS)
                    .copied()
                    .collect();
                Some(random_from(&charset, len))
            }),
            SystemVariable::new(
                "randomPassword",
                r"^\$randomPassword(?:\s+(\S+))?$",
                |caps, _| {
                    let len = optional_length(caps, DEFAULT_PASSWORD_LENGTH)?;
                    let charset: Vec<u8> = ALPHABETIC
                        .iter()
                        .chain(b"0123456789")
                        .chain(PASSWORD_SYMBOLS)
                        .copied()
                        .collect();
                    Some(random_from(&charset, len))
                },
            ),
            SystemVariable::new("randomBoolean", r"^\$randomBoolean$", |_, _| {
                Some(rand::thread_rng().gen_bool(0.5).to_string())
            }),
            SystemVariable::new("randomEmail", r"^\$randomEmail$", |_, _| {
                Some(format!(
                    "{}.{}@{}",
                    random_word(),
                    random_word(),
                    random_domain()
                ))
            }),
            SystemVariable::new("randomDomain", r"^\$randomDomain$", |_, _| {
                Some(random_domain())
            }),
            SystemVariable::new("randomIPv4", r"^\$randomIPv4$", |_, _| {
                let mut rng = rand::thread_rng();
                let octets: [u8; 4] = rng.gen();
                Some(format!(
                    "{}.{}.{}.{}",
                    octets[0], octets[1], octets[2], octets[3]
                ))
            }),
            SystemVariable::new("randomIPv6", r"^\$randomIPv6$", |_, _| {
                let mut rng = rand::thread_rng();
                let groups: Vec<String> = (0..8)
                    .map(|_| format!("{:x}", rng.gen::<u16>()))
                    .collect();
                Some(groups.join(":"))
            }),
            SystemVariable::new("randomColor", r"^\$randomColor$", |_, _| {
                Some(format!("#{:06x}", rand::thread_rng().gen_range(0..=0xFF_FFFFu32)))
            }),
            SystemVariable::new("randomWord", r"^\$randomWord$", |_, _| Some(random_word())),
            SystemVariable::new("processEnv", r"^\$processEnv\s+(%?)(\S+)$", process_env),
            SystemVariable::new("dotenv", r"^\$dotenv\s+(\S+)$", |caps, ctx| {
                ctx.dotenv.get(&caps[1]).cloned()
            }),
            SystemVariable::new(
                "timestamp",
                r"^\$timestamp(?:\s+(\S+)\s+(\S+))?$",
                timestamp,
            ),
            SystemVariable::new(
                "datetime",
                r"^\$(datetime|localDatetime)((?:\s+\S+)*)$",
                datetime,
            ),
        ];

        Self { entries }
    }

    /// Finds the entry whose pattern matches `directive`.
    fn find<'d>(&self, directive: &'d str) -> Option<(&SystemVariable, Captures<'d>)> {
        self.entries
            .iter()
            .find_map(|entry| entry.pattern.captures(directive).map(|caps| (entry, caps)))
    }

    /// Evaluates a directive. `None` means the placeholder should stay
    /// literal.
    pub fn evaluate(&self, directive: &str, ctx: &GeneratorContext<'_>) -> Option<String> {
        let directive = directive.trim();
        let (entry, caps) = self.find(directive)?;
        let value = (entry.handler)(&caps, ctx);
        if value.is_none() {
            log::debug!("System variable '{}' left unresolved", directive);
        }
        value
    }
}

/// Generates the values that stay fixed for a whole request: `$uuid`
/// (also reachable as `$guid`), argumentless `$timestamp` and argumentless
/// `$randomInt`.
pub fn pregenerate_request_variables() -> HashMap<String, String> {
    let uuid = generate_uuid();
    let mut vars = HashMap::with_capacity(PREGENERATED_KEYS.len());
    vars.insert("$uuid".to_string(), uuid.clone());
    vars.insert("$guid".to_string(), uuid);
    vars.insert("$timestamp".to_string(), Utc::now().timestamp().to_string());
    vars.insert(
        "$randomInt".to_string(),
        rand::thread_rng().gen_range(0..i32::MAX).to_string(),
    );
    vars
}

fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// `{{$randomInt}}` or `{{$randomInt min max}}` (inclusive).
///
/// Swapped bounds are rejected like any other malformed argument.
fn random_int(caps: &Captures<'_>, _: &GeneratorContext<'_>) -> Option<String> {
    let mut rng = rand::thread_rng();
    let (Some(min), Some(max)) = (caps.get(1), caps.get(2)) else {
        return Some(rng.gen_range(0..i32::MAX).to_string());
    };

    let min: i64 = min.as_str().parse().ok()?;
    let max: i64 = max.as_str().parse().ok()?;
    if min > max {
        return None;
    }

    Some(rng.gen_range(min..=max).to_string())
}

/// `{{$randomFloat}}` in `[0, 1)` or `{{$randomFloat min max}}`.
fn random_float(caps: &Captures<'_>, _: &GeneratorContext<'_>) -> Option<String> {
    let mut rng = rand::thread_rng();
    let (Some(min), Some(max)) = (caps.get(1), caps.get(2)) else {
        return Some(rng.gen::<f64>().to_string());
    };

    let min: f64 = min.as_str().parse().ok()?;
    let max: f64 = max.as_str().parse().ok()?;
    if !min.is_finite() || !max.is_finite() || min > max {
        return None;
    }
    if !(max - min).is_finite() {
        return None;
    }
    if min == max {
        return Some(min.to_string());
    }

    Some(rng.sample(Uniform::new(min, max)).to_string())
}

fn optional_length(caps: &Captures<'_>, default: usize) -> Option<usize> {
    match caps.get(1) {
        None => Some(default),
        Some(m) => {
            let len: usize = m.as_str().parse().ok()?;
            (1..=MAX_RANDOM_LENGTH).contains(&len).then_some(len)
        }
    }
}

fn random_from(charset: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| charset[rng.gen_range(0..charset.len())] as char)
        .collect()
}

fn random_word() -> String {
    WORDS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("word")
        .to_string()
}

fn random_domain() -> String {
    let mut rng = rand::thread_rng();
    let tld = TOP_LEVEL_DOMAINS.choose(&mut rng).copied().unwrap_or("com");
    format!("{}{}.{}", random_word(), rng.gen_range(1..1000), tld)
}

/// `{{$processEnv NAME}}` or `{{$processEnv %NAME}}`.
///
/// The `%` form resolves to an empty string when the variable is unset.
fn process_env(caps: &Captures<'_>, ctx: &GeneratorContext<'_>) -> Option<String> {
    let optional = !caps[1].is_empty();
    match ctx.process_env.var(&caps[2]) {
        Some(value) => Some(value),
        None if optional => Some(String::new()),
        None => None,
    }
}

/// `{{$timestamp}}` or `{{$timestamp -1 d}}`.
fn timestamp(caps: &Captures<'_>, _: &GeneratorContext<'_>) -> Option<String> {
    let now = Utc::now();
    let datetime = match (caps.get(1), caps.get(2)) {
        (Some(amount), Some(unit)) => apply_offset(now, amount.as_str(), unit.as_str())?,
        _ => now,
    };
    Some(datetime.timestamp().to_string())
}

/// `{{$datetime [format] [offset unit]}}` and the `$localDatetime` variant.
///
/// The format defaults to `iso8601`.
fn datetime(caps: &Captures<'_>, _: &GeneratorContext<'_>) -> Option<String> {
    let local = &caps[1] == "localDatetime";
    let args: Vec<&str> = caps[2].split_whitespace().collect();

    let (format, offset) = match args.as_slice() {
        [] => (None, None),
        [format] => (Some(*format), None),
        [amount, unit] => (None, Some((*amount, *unit))),
        [format, amount, unit] => (Some(*format), Some((*amount, *unit))),
        _ => return None,
    };

    let now = Utc::now();
    let datetime = match offset {
        Some((amount, unit)) => apply_offset(now, amount, unit)?,
        None => now,
    };

    format_datetime(datetime, format.unwrap_or("iso8601"), local)
}

fn format_datetime(datetime: DateTime<Utc>, format: &str, local: bool) -> Option<String> {
    match format.to_ascii_lowercase().as_str() {
        "rfc1123" if local => Some(datetime.with_timezone(&Local).to_rfc2822()),
        "rfc1123" => Some(datetime.format("%a, %d %b %Y %H:%M:%S GMT").to_string()),
        "iso8601" if local => Some(
            datetime
                .with_timezone(&Local)
                .to_rfc3339_opts(SecondsFormat::Millis, false),
        ),
        "iso8601" => Some(datetime.to_rfc3339_opts(SecondsFormat::Millis, true)),
        "timestamp" => Some(datetime.timestamp().to_string()),
        // TODO: support quoted custom patterns such as '%Y-%m-%d'
        _ => None,
    }
}

/// Shifts `base` by `amount` units.
///
/// Units: `ms`, `s`, `m`, `h`, `d`, `w`. The amount may carry a sign.
fn apply_offset(base: DateTime<Utc>, amount: &str, unit: &str) -> Option<DateTime<Utc>> {
    let amount: i64 = amount.parse().ok()?;

    let duration = match unit {
        "ms" => Duration::try_milliseconds(amount)?,
        "s" => Duration::try_seconds(amount)?,
        "m" => Duration::try_minutes(amount)?,
        "h" => Duration::try_hours(amount)?,
        "d" => Duration::try_days(amount)?,
        "w" => Duration::try_weeks(amount)?,
        _ => return None,
    };

    base.checked_add_signed(duration)
}
