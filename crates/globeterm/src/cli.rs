#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand. Every option has a `GLOBETERM_*` environment
//! override; environment values apply first and explicit flags win.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use globeterm_core::ConfigError;
use globeterm_render::{RenderMode, Theme};
use globeterm_runtime::RuntimeConfig;
use globeterm_runtime::config::{DEFAULT_FPS, MAX_FPS, MAX_SPEED, MIN_FPS, MIN_SPEED};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
globeterm - an interactive 3D globe in your terminal

USAGE:
    globeterm [OPTIONS]

OPTIONS:
    --speed=F            Auto-rotation speed multiplier, 0-20 (default: 1.0)
    --theme=NAME         Color theme: geography (default), matrix
    --size=NAME          Initial size: small, medium, large, auto (default)
    --mode=NAME          Glyphs: auto (default), ascii, block, braille, theme
    --fps=N              Target frame rate, 1-120 (default: 30)
    --no-color           Monochrome output
    --no-mouse           Never enable mouse tracking
    --log-file=PATH      Write diagnostic logs to PATH
    --exit-after-ms=N    Quit automatically after N milliseconds (0 = never)
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Mouse drag           Rotate the globe
    Mouse wheel          Zoom in / out
    Arrow keys           Rotate
    + / =  and  - / _    Zoom in / out
    q / Ctrl+C           Quit

ENVIRONMENT VARIABLES:
    GLOBETERM_SPEED          Override --speed
    GLOBETERM_THEME          Override --theme
    GLOBETERM_SIZE           Override --size
    GLOBETERM_MODE           Override --mode
    GLOBETERM_FPS            Override --fps
    GLOBETERM_NO_COLOR       Same as --no-color (NO_COLOR is honored too)
    GLOBETERM_NO_MOUSE       Same as --no-mouse
    GLOBETERM_LOG_FILE       Override --log-file
    GLOBETERM_LOG            Log filter, e.g. 'debug' or 'globeterm_core=trace'
    GLOBETERM_EXIT_AFTER_MS  Auto-quit after N milliseconds (for testing)";

/// Initial zoom preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizePreset {
    Small,
    Medium,
    Large,
    #[default]
    Auto,
}

impl SizePreset {
    const NAMES: [&'static str; 4] = ["small", "medium", "large", "auto"];

    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "small" => Some(Self::Small),
            "medium" => Some(Self::Medium),
            "large" => Some(Self::Large),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    #[must_use]
    pub fn zoom(self) -> f64 {
        match self {
            Self::Small => 0.5,
            Self::Medium => 0.75,
            Self::Large | Self::Auto => 1.0,
        }
    }
}

/// `--mode`: a fixed glyph set, or pick one from the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeChoice {
    #[default]
    Auto,
    Fixed(RenderMode),
}

impl ModeChoice {
    fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("auto") {
            return Some(Self::Auto);
        }
        RenderMode::from_name(name).map(Self::Fixed)
    }

    /// `Auto` picks block glyphs on UTF-8 locales and ASCII elsewhere.
    #[must_use]
    pub fn resolve(self, locale: Option<&str>) -> RenderMode {
        match self {
            Self::Fixed(mode) => mode,
            Self::Auto => {
                let utf8 = locale.is_some_and(|l| {
                    let l = l.to_ascii_lowercase();
                    l.contains("utf-8") || l.contains("utf8")
                });
                if utf8 { RenderMode::Block } else { RenderMode::Ascii }
            }
        }
    }
}

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq)]
pub struct Opts {
    pub speed: f64,
    pub theme: Theme,
    pub size: SizePreset,
    pub mode: ModeChoice,
    pub fps: u32,
    pub no_color: bool,
    pub mouse: bool,
    pub log_file: Option<PathBuf>,
    /// EnvFilter directives from `GLOBETERM_LOG`.
    pub log_filter: Option<String>,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
    /// First non-empty of `LC_ALL`, `LC_CTYPE`, `LANG`.
    pub locale: Option<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            speed: 1.0,
            theme: Theme::geography(),
            size: SizePreset::Auto,
            mode: ModeChoice::Auto,
            fps: DEFAULT_FPS,
            no_color: false,
            mouse: true,
            log_file: None,
            log_filter: None,
            exit_after_ms: 0,
            locale: None,
        }
    }
}

fn parse_speed(value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(speed) if speed.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&speed) => Ok(speed),
        _ => Err(ConfigError::OutOfRange {
            option: "speed",
            value: value.to_owned(),
            expected: "a number between 0 and 20",
        }),
    }
}

fn parse_fps(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(fps) if (MIN_FPS..=MAX_FPS).contains(&fps) => Ok(fps),
        _ => Err(ConfigError::OutOfRange {
            option: "fps",
            value: value.to_owned(),
            expected: "an integer between 1 and 120",
        }),
    }
}

fn parse_exit_after(value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::OutOfRange {
        option: "exit-after-ms",
        value: value.to_owned(),
        expected: "a non-negative integer",
    })
}

fn parse_size(value: &str) -> Result<SizePreset, ConfigError> {
    SizePreset::from_name(value).ok_or_else(|| ConfigError::UnknownValue {
        option: "size",
        value: value.to_owned(),
        allowed: SizePreset::NAMES.iter().map(|s| (*s).to_owned()).collect(),
    })
}

fn parse_mode(value: &str) -> Result<ModeChoice, ConfigError> {
    ModeChoice::from_name(value).ok_or_else(|| ConfigError::UnknownValue {
        option: "mode",
        value: value.to_owned(),
        allowed: std::iter::once("auto")
            .chain(RenderMode::NAMES)
            .map(str::to_owned)
            .collect(),
    })
}

/// Environment flags are on when set to anything but empty, `0` or `false`.
fn env_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim();
        !(v.is_empty() || v == "0" || v.eq_ignore_ascii_case("false"))
    })
}

impl Opts {
    /// Parse the process arguments and environment.
    pub fn parse() -> Result<Command, ConfigError> {
        Self::parse_from(env::args().skip(1), |key| env::var(key).ok())
    }

    /// Parse `args` (without the program name) with `env` as the environment.
    pub fn parse_from<I, E>(args: I, env: E) -> Result<Command, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();
        let var = |key: &str| env(key).filter(|v| !v.is_empty());

        // Environment first.
        if let Some(val) = var("GLOBETERM_SPEED") {
            opts.speed = parse_speed(&val)?;
        }
        if let Some(val) = var("GLOBETERM_THEME") {
            opts.theme = Theme::by_name(&val)?;
        }
        if let Some(val) = var("GLOBETERM_SIZE") {
            opts.size = parse_size(&val)?;
        }
        if let Some(val) = var("GLOBETERM_MODE") {
            opts.mode = parse_mode(&val)?;
        }
        if let Some(val) = var("GLOBETERM_FPS") {
            opts.fps = parse_fps(&val)?;
        }
        if let Some(val) = var("GLOBETERM_EXIT_AFTER_MS") {
            opts.exit_after_ms = parse_exit_after(&val)?;
        }
        opts.no_color = env_flag(var("GLOBETERM_NO_COLOR")) || var("NO_COLOR").is_some();
        opts.mouse = !env_flag(var("GLOBETERM_NO_MOUSE"));
        opts.log_file = var("GLOBETERM_LOG_FILE").map(PathBuf::from);
        opts.log_filter = var("GLOBETERM_LOG");
        opts.locale = ["LC_ALL", "LC_CTYPE", "LANG"].into_iter().find_map(var);

        // Command-line args override the environment.
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_owned(), Some(value.to_owned())),
                _ => (arg.clone(), None),
            };
            let mut value = |name: &'static str| match inline.clone() {
                Some(v) => Ok(v),
                None => args.next().ok_or(ConfigError::MissingValue(name)),
            };
            match flag.as_str() {
                "--help" | "-h" if inline.is_none() => return Ok(Command::Help),
                "--version" | "-V" if inline.is_none() => return Ok(Command::Version),
                "--no-color" if inline.is_none() => opts.no_color = true,
                "--no-mouse" if inline.is_none() => opts.mouse = false,
                "--speed" => opts.speed = parse_speed(&value("--speed")?)?,
                "--theme" => opts.theme = Theme::by_name(&value("--theme")?)?,
                "--size" => opts.size = parse_size(&value("--size")?)?,
                "--mode" => opts.mode = parse_mode(&value("--mode")?)?,
                "--fps" => opts.fps = parse_fps(&value("--fps")?)?,
                "--log-file" => opts.log_file = Some(PathBuf::from(value("--log-file")?)),
                "--exit-after-ms" => {
                    opts.exit_after_ms = parse_exit_after(&value("--exit-after-ms")?)?;
                }
                _ => return Err(ConfigError::UnknownFlag(arg)),
            }
        }

        Ok(Command::Run(opts))
    }

    /// Runtime configuration for these options.
    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            speed: self.speed,
            theme: self.theme.clone(),
            mode: self.mode.resolve(self.locale.as_deref()),
            monochrome: self.no_color,
            initial_zoom: self.size.zoom(),
            fps: self.fps,
            mouse: self.mouse,
            exit_after: (self.exit_after_ms > 0).then(|| Duration::from_millis(self.exit_after_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Command, ConfigError> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Opts::parse_from(args.iter().map(|s| (*s).to_owned()), |key| env.get(key).cloned())
    }

    fn opts(args: &[&str], env: &[(&str, &str)]) -> Opts {
        match parse(args, env) {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected options, got {other:?}"),
        }
    }

    #[test]
    fn defaults() {
        let o = opts(&[], &[]);
        assert_eq!(o, Opts::default());
        let config = o.runtime_config();
        assert_eq!(config.fps, 30);
        assert_eq!(config.initial_zoom, 1.0);
        assert_eq!(config.exit_after, None);
        assert_eq!(config.mode, RenderMode::Ascii);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn both_value_forms() {
        let o = opts(&["--speed=2.5", "--fps", "60", "--theme", "Matrix"], &[]);
        assert_eq!(o.speed, 2.5);
        assert_eq!(o.fps, 60);
        assert_eq!(o.theme.name(), "matrix");
    }

    #[test]
    fn flags_override_environment() {
        let env = [("GLOBETERM_SPEED", "3"), ("GLOBETERM_SIZE", "small")];
        let o = opts(&["--speed=4"], &env);
        assert_eq!(o.speed, 4.0);
        assert_eq!(o.size, SizePreset::Small);
        assert_eq!(o.runtime_config().initial_zoom, 0.5);
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["--help"], &[]), Ok(Command::Help));
        assert_eq!(parse(&["-V"], &[]), Ok(Command::Version));
        // Help wins even after other options.
        assert_eq!(parse(&["--fps=10", "-h"], &[]), Ok(Command::Help));
    }

    #[test]
    fn help_lists_every_flag() {
        for flag in [
            "--speed=", "--theme=", "--size=", "--mode=", "--fps=", "--no-color",
            "--no-mouse", "--log-file=", "--exit-after-ms=", "--help", "--version",
        ] {
            assert!(HELP_TEXT.contains(flag), "{flag} missing from help");
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for args in [
            &["--speed=-1"][..],
            &["--speed=inf"],
            &["--speed=NaN"],
            &["--speed=20.5"],
            &["--fps=0"],
            &["--fps=121"],
            &["--fps=fast"],
            &["--exit-after-ms=-5"],
        ] {
            assert!(
                matches!(parse(args, &[]), Err(ConfigError::OutOfRange { .. })),
                "{args:?}"
            );
        }
    }

    #[test]
    fn unknown_names_list_alternatives() {
        let err = parse(&["--theme=neon"], &[]).unwrap_err();
        assert_eq!(err.to_string(), "unknown theme 'neon'. Available: geography, matrix");
        let err = parse(&["--mode=emoji"], &[]).unwrap_err();
        assert!(err.to_string().contains("auto, ascii, block, braille, theme"));
        assert!(matches!(
            parse(&["--size=huge"], &[]),
            Err(ConfigError::UnknownValue { option: "size", .. })
        ));
    }

    #[test]
    fn bad_environment_is_rejected() {
        assert!(parse(&[], &[("GLOBETERM_FPS", "1000")]).is_err());
        assert!(parse(&[], &[("GLOBETERM_THEME", "neon")]).is_err());
    }

    #[test]
    fn missing_value_and_unknown_flag() {
        assert_eq!(parse(&["--fps"], &[]), Err(ConfigError::MissingValue("--fps")));
        assert_eq!(
            parse(&["--colour"], &[]),
            Err(ConfigError::UnknownFlag("--colour".into()))
        );
        assert_eq!(
            parse(&["--no-mouse=yes"], &[]),
            Err(ConfigError::UnknownFlag("--no-mouse=yes".into()))
        );
    }

    #[test]
    fn boolean_flags_and_env() {
        let o = opts(&["--no-color", "--no-mouse"], &[]);
        assert!(o.no_color);
        assert!(!o.mouse);
        assert!(opts(&[], &[("NO_COLOR", "1")]).no_color);
        assert!(!opts(&[], &[("GLOBETERM_NO_COLOR", "0")]).no_color);
        assert!(!opts(&[], &[("GLOBETERM_NO_MOUSE", "true")]).mouse);
        assert!(opts(&[], &[("GLOBETERM_NO_MOUSE", "false")]).mouse);
    }

    #[test]
    fn auto_mode_follows_locale() {
        assert_eq!(ModeChoice::Auto.resolve(Some("en_US.UTF-8")), RenderMode::Block);
        assert_eq!(ModeChoice::Auto.resolve(Some("C.utf8")), RenderMode::Block);
        assert_eq!(ModeChoice::Auto.resolve(Some("C")), RenderMode::Ascii);
        assert_eq!(ModeChoice::Auto.resolve(None), RenderMode::Ascii);
        let o = opts(&[], &[("LC_ALL", ""), ("LC_CTYPE", "en_GB.UTF-8"), ("LANG", "C")]);
        assert_eq!(o.runtime_config().mode, RenderMode::Block);
        let o = opts(&["--mode=braille"], &[("LANG", "C")]);
        assert_eq!(o.runtime_config().mode, RenderMode::Braille);
    }

    #[test]
    fn exit_after_and_log_file() {
        let o = opts(
            &["--exit-after-ms", "250", "--log-file=/tmp/globe.log"],
            &[("GLOBETERM_LOG", "debug")],
        );
        assert_eq!(o.runtime_config().exit_after, Some(Duration::from_millis(250)));
        assert_eq!(o.log_file, Some(PathBuf::from("/tmp/globe.log")));
        assert_eq!(o.log_filter.as_deref(), Some("debug"));
    }
}
