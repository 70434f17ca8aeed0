use chrono::TimeDelta;
use clap::Parser;

/// Delete expired tags from a Docker Registry V2
#[derive(Parser, Debug)]
#[command(name = "regsweep", version, about)]
pub struct Cli {
    /// Registry URL (e.g., http://registry.service.consul)
    #[arg(long, env = "REGSWEEP_REGISTRY", default_value = "")]
    pub registry: String,

    /// Age after which a tag is deleted (e.g., 168h, 7d, 1h30m)
    #[arg(long, env = "REGSWEEP_TTL", default_value = "168h", value_parser = parse_duration)]
    pub ttl: TimeDelta,

    /// Repositories to ignore (e.g., redis,postgres)
    #[arg(long, env = "REGSWEEP_EXCEPT", value_delimiter = ',')]
    pub except: Vec<String>,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

/// Parse a duration made of `<integer><unit>` segments, units w/d/h/m/s.
pub fn parse_duration(input: &str) -> Result<TimeDelta, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration is empty".to_string());
    }

    let mut total = TimeDelta::zero();
    let mut digits = String::new();

    for c in input.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        if digits.is_empty() {
            return Err(format!("expected a number before '{}' in '{}'", c, input));
        }
        let n: i64 = digits
            .parse()
            .map_err(|_| format!("number too large in '{}'", input))?;
        digits.clear();

        let unit_seconds: i64 = match c {
            'w' => 604_800,
            'd' => 86_400,
            'h' => 3_600,
            'm' => 60,
            's' => 1,
            _ => return Err(format!("unknown unit '{}' in '{}'", c, input)),
        };

        let segment = n
            .checked_mul(unit_seconds)
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| format!("duration '{}' is out of range", input))?;
        total = total
            .checked_add(&segment)
            .ok_or_else(|| format!("duration '{}' is out of range", input))?;
    }

    if !digits.is_empty() {
        return Err(format!("missing unit after '{}' in '{}'", digits, input));
    }

    Ok(total)
}
