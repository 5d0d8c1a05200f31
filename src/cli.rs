use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trashmon")]
#[command(about = "쓰레기 몬스터를 찍고 분리수거를 배우는 도감 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 자세한 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 사진을 찍어서 몬스터를 포획
    Capture {
        /// 카메라 피드 (이미지 파일 또는 가장 최근 사진이 들어오는 폴더)
        #[arg(required = true)]
        source: PathBuf,

        /// 몬스터 이름 (지정하면 묻지 않고 진행)
        #[arg(short, long)]
        name: Option<String>,

        /// 이름을 짓지 않고 놓아주기
        #[arg(long, conflicts_with = "name")]
        release: bool,

        /// 오프라인 데모 모드 (서버 없이 임의의 몬스터)
        #[arg(long)]
        demo: bool,

        /// 순서 (guide-first: 안내 후 이름, name-first: 이름 후 안내)
        #[arg(long)]
        order: Option<OrderArg>,
    },

    /// 도감 관리
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// 분리수거 방법 보기
    Guide {
        /// 분류 (종이/유리/플라스틱/캔/일반쓰레기 또는 paper/glass/plastic/can/general-waste)
        category: String,
    },

    /// 설정
    Config {
        /// 분류 서버 주소
        #[arg(long)]
        set_api_url: Option<String>,

        /// 데모 모드 기본값
        #[arg(long)]
        demo_mode: Option<Toggle>,

        /// 설정 표시
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum CollectionAction {
    /// 도감 목록 (최근 순)
    List {
        /// JSON으로 출력 (이미지 제외)
        #[arg(long)]
        json: bool,
    },

    /// 몬스터 한 마리 보기
    Show {
        id: u64,

        /// 몬스터 이미지를 파일로 저장
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// 이름 바꾸기
    Rename { id: u64, name: String },

    /// 도감 비우기
    Clear {
        /// 확인 없이 삭제
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OrderArg {
    GuideFirst,
    NameFirst,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(&self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_capture_scripted() {
        let cli = Cli::try_parse_from(["trashmon", "capture", "feed/", "--name", "Canny", "--demo"]).unwrap();
        match cli.command {
            Commands::Capture { source, name, release, demo, order } => {
                assert_eq!(source, PathBuf::from("feed/"));
                assert_eq!(name.as_deref(), Some("Canny"));
                assert!(!release);
                assert!(demo);
                assert!(order.is_none());
            }
            _ => panic!("expected capture"),
        }
    }

    #[test]
    fn test_name_conflicts_with_release() {
        assert!(Cli::try_parse_from(["trashmon", "capture", "f.jpg", "--name", "a", "--release"]).is_err());
    }

    #[test]
    fn test_parse_collection_rename() {
        let cli = Cli::try_parse_from(["trashmon", "-v", "collection", "rename", "3", "새이름"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Collection { action: CollectionAction::Rename { id: 3, .. } }
        ));
    }

    #[test]
    fn test_parse_order_value() {
        let cli = Cli::try_parse_from(["trashmon", "capture", "f.jpg", "--order", "name-first"]).unwrap();
        assert!(matches!(cli.command, Commands::Capture { order: Some(OrderArg::NameFirst), .. }));
    }
}
