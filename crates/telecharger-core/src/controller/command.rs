//! Downloader argument construction.

use std::path::Path;

use crate::job_db::Job;

pub const EXTRACT_AUDIO_FLAG: &str = "-x";
pub const AUDIO_FORMAT_FLAG: &str = "--audio-format";
pub const DEFAULT_AUDIO_FORMAT: &str = "m4a";
pub const EMBED_THUMBNAIL_FLAG: &str = "--embed-thumbnail";
pub const OUTPUT_FLAG: &str = "-o";

/// Build the downloader argument list for `job`.
///
/// Order is fixed: format flags, extra arguments, thumbnail flag, output
/// template, source. Extra arguments are passed as literal argv entries and
/// `%(ext)s` is left for the downloader to expand.
pub fn build_download_args(job: &Job, download_folder: &Path) -> Vec<String> {
    let mut args = Vec::new();

    if job.audio_only {
        args.push(EXTRACT_AUDIO_FLAG.to_string());
        args.push(AUDIO_FORMAT_FLAG.to_string());
        if job.audio_format.is_empty() {
            args.push(DEFAULT_AUDIO_FORMAT.to_string());
        } else {
            args.push(job.audio_format.clone());
        }
    }

    args.extend(job.extra_args.split_whitespace().map(str::to_string));

    if job.embed_thumbnail {
        args.push(EMBED_THUMBNAIL_FLAG.to_string());
    }

    if !job.output_name.is_empty() {
        args.push(OUTPUT_FLAG.to_string());
        args.push(format!(
            "{}/{}.%(ext)s",
            download_folder.display(),
            job.output_name
        ));
    }

    args.push(job.source.clone());
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_db::JobStatus;

    fn job() -> Job {
        Job {
            id: 1,
            source: "abc123".to_string(),
            output_name: "song".to_string(),
            audio_only: false,
            audio_format: String::new(),
            embed_thumbnail: false,
            extra_args: String::new(),
            status: JobStatus::Queued,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn full_option_set_in_fixed_order() {
        let job = Job {
            audio_only: true,
            embed_thumbnail: true,
            extra_args: "--foo bar".to_string(),
            ..job()
        };
        assert_eq!(
            build_download_args(&job, Path::new("/music")),
            vec![
                "-x",
                "--audio-format",
                "m4a",
                "--foo",
                "bar",
                "--embed-thumbnail",
                "-o",
                "/music/song.%(ext)s",
                "abc123",
            ]
        );
    }

    #[test]
    fn plain_video_only_has_output_and_source() {
        assert_eq!(
            build_download_args(&job(), Path::new(".")),
            vec!["-o", "./song.%(ext)s", "abc123"]
        );
    }

    #[test]
    fn explicit_audio_format_is_used() {
        let job = Job {
            audio_only: true,
            audio_format: "mp3".to_string(),
            ..job()
        };
        let args = build_download_args(&job, Path::new("."));
        assert_eq!(&args[..3], ["-x", "--audio-format", "mp3"]);
    }

    #[test]
    fn audio_format_ignored_without_audio_only() {
        let job = Job {
            audio_format: "mp3".to_string(),
            ..job()
        };
        assert!(!build_download_args(&job, Path::new(".")).contains(&"mp3".to_string()));
    }

    #[test]
    fn extra_args_are_split_on_any_whitespace_and_never_shell_parsed() {
        let job = Job {
            extra_args: "  --limit-rate\t1M   --exec 'rm -rf' ".to_string(),
            ..job()
        };
        let args = build_download_args(&job, Path::new("."));
        assert_eq!(
            &args[..5],
            ["--limit-rate", "1M", "--exec", "'rm", "-rf'"]
        );
    }

    #[test]
    fn empty_output_name_skips_template() {
        let job = Job {
            output_name: String::new(),
            ..job()
        };
        assert_eq!(build_download_args(&job, Path::new(".")), vec!["abc123"]);
    }
}
