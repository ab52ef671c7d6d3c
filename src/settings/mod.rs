use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, value_parser};

#[derive(Parser, Debug)]
#[command(name = "fscene-viewer")]
#[command(version)]
#[command(about = "Imports an Unreal Engine scene statistics export and summarises it")]
pub struct CliArgs {
    /// Scene export directory (`World_<Scene>`). Imported right away when given.
    #[arg(long, env = "FSCENE_DIR")]
    pub dir: Option<PathBuf>,

    /// Factor applied to the imported bounds, the export is in centimetres.
    #[arg(long, env = "FSCENE_SCALE", default_value = "0.001", value_parser = value_parser!(Scale))]
    pub scale: Scale,

    /// LOD the viewer displays.
    #[arg(long, default_value_t = 0)]
    pub lod: usize,

    #[arg(long, default_value_t = 16)]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale(pub f32);

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<f32>()
            .map_err(|err| format!("{:?} is not a number: {}", s, err))?;

        if !value.is_finite() || value <= 0.0 {
            return Err(format!("Scale must be a positive, finite number, got {}", value));
        }

        Ok(Scale(value))
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::{CliArgs, Scale};
    use clap::Parser;
    use std::str::FromStr;

    #[test]
    fn scale_must_be_positive() {
        assert_eq!(Scale::from_str(" 0.5 "), Ok(Scale(0.5)));
        assert!(Scale::from_str("0").is_err());
        assert!(Scale::from_str("-1").is_err());
        assert!(Scale::from_str("inf").is_err());
        assert!(Scale::from_str("NaN").is_err());
        assert!(Scale::from_str("big").is_err());
    }

    #[test]
    fn defaults() {
        let args = CliArgs::parse_from(["fscene-viewer", "--dir", "World_Foo"]);
        assert_eq!(args.scale, Scale(0.001));
        assert_eq!(args.lod, 0);
        assert_eq!(args.poll_interval_ms, 16);
        assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("World_Foo")));
    }
}
