use crate::assembly::{inspect, Assembly};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::{env, path::PathBuf, process};

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Compression {
    Default,
    Fast,
    Best,
}

impl From<Compression> for png::Compression {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Default => png::Compression::Default,
            Compression::Fast => png::Compression::Fast,
            Compression::Best => png::Compression::Best,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 将目录下的 PNG 按文件名顺序组装为 APNG
    Assemble {
        #[arg(
            short = 'p',
            long,
            help = "帧所在的文件夹路径，传入当前工作路径的相对路径。默认当前工作路径"
        )]
        path: Option<PathBuf>,

        #[arg(short = 'o', long, help = "输出文件路径，默认 <path>/animation.png")]
        output: Option<PathBuf>,

        #[arg(short = 'd', long, default_value_t = 100, help = "每帧显示时长，毫秒")]
        delay: u16,

        #[arg(short = 'l', long, default_value_t = 0, help = "循环次数，0 为无限循环")]
        plays: u32,

        #[arg(
            short = 'c',
            long,
            value_enum,
            default_value_t = Compression::Default,
            help = "帧的压缩等级，default、fast、best 三种"
        )]
        compression: Compression,
    },
    /// 打印 APNG 文件的帧信息
    Inspect {
        /// APNG 文件路径
        file: PathBuf,
    },
}

/// 处理命令行参数
pub fn args_handle() {
    let args = Args::parse();

    let result = match args.command {
        Command::Assemble {
            path,
            output,
            delay,
            plays,
            compression,
        } => {
            // 获取工作路径
            let path = match path {
                Some(path) => path,
                None => env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            };
            let output = output.unwrap_or_else(|| path.join("animation.png"));
            log::debug!(
                "assemble {} -> {} (delay {} ms, plays {}, {:?})",
                path.display(),
                output.display(),
                delay,
                plays,
                compression
            );

            Assembly::new(path, output, delay, plays, compression.into())
                .assemble()
                .map_err(|err| err.to_string())
        }
        Command::Inspect { file } => inspect(&file).map_err(|err| err.to_string()),
    };

    if let Err(err) = result {
        eprintln!("{} {}", "error:".red().bold(), err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_assemble_flags() {
        let args = Args::parse_from([
            "apng-assembler",
            "assemble",
            "-p",
            "frames",
            "-d",
            "40",
            "-c",
            "fast",
        ]);
        match args.command {
            Command::Assemble {
                path,
                output,
                delay,
                plays,
                compression,
            } => {
                assert_eq!(path, Some(PathBuf::from("frames")));
                assert_eq!(output, None);
                assert_eq!(delay, 40);
                assert_eq!(plays, 0);
                assert!(matches!(compression, Compression::Fast));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn delay_must_fit_sixteen_bits() {
        assert!(Args::try_parse_from(["apng-assembler", "assemble", "-d", "70000"]).is_err());
    }
}
