//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{error, info};

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::{InspectFormat, InspectRequest};
use crate::cli::args::{AudioCodecArg, ConcatArgs, InspectArgs, TranscodeArgs, VideoCodecArg};
use crate::domain::model::*;
use crate::engine::codecs::{AudioCodec, Codec, LibSvtAv1, Libx264, X264Preset};
use crate::engine::command::{display_command, OverwritePolicy, TranscodeBuilder, TranscodeJob};
use crate::engine::filters::{Filter, ScaleResolution};
use crate::engine::inputs::{ConcatEntry, ConcatInput, FileInput};
use crate::engine::output::OutputFile;
use crate::engine::progress::{
    ConsoleProgressCallback, JsonProgressCallback, NoOpProgressCallback, ProgressDispatcher,
};
use crate::engine::streams::{Language, StreamOptions};

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("Input file does not exist: {}", path.display());
    }
    Ok(())
}

fn overwrite_policy(settings: &FfwrapSettings) -> OverwritePolicy {
    if settings.overwrite {
        OverwritePolicy::Overwrite
    } else {
        OverwritePolicy::Skip
    }
}

/// Progress callbacks for the configured mode
pub fn progress_dispatcher(mode: ProgressMode) -> ProgressDispatcher {
    let mut dispatcher = ProgressDispatcher::new();
    match mode {
        ProgressMode::Console => dispatcher.add_callback(Arc::new(ConsoleProgressCallback::new(false))),
        ProgressMode::Json => dispatcher.add_callback(Arc::new(JsonProgressCallback::new(false))),
        ProgressMode::None => dispatcher.add_callback(Arc::new(NoOpProgressCallback)),
    }
    dispatcher
}

/// Per-stream options for video from the command line
pub fn video_options(args: &TranscodeArgs) -> Result<StreamOptions> {
    let mut filters = Vec::new();
    if args.deinterlace {
        filters.push(Filter::Bwdif);
    }
    if let Some(height) = args.scale {
        let filter = match ScaleResolution::from_height(height) {
            Some(resolution) => Filter::scale_to(resolution),
            None => Filter::scale(-2, i32::try_from(height).context("Scale height is too large")?),
        };
        filters.push(filter);
    }

    let codec: Codec = match args.video_codec {
        VideoCodecArg::Copy => {
            if !filters.is_empty() {
                bail!("--scale and --deinterlace need a video encoder; pick one with --video-codec");
            }
            Codec::Copy
        }
        VideoCodecArg::Libx264 => {
            let mut codec = Libx264::new();
            if let Some(crf) = args.crf {
                codec = codec.with_crf(i32::from(crf));
            }
            if let Some(preset) = &args.preset {
                let preset: X264Preset = preset.parse().map_err(|e| anyhow!("{}", e))?;
                codec = codec.with_preset(preset);
            }
            codec.into()
        }
        VideoCodecArg::Libsvtav1 => {
            let mut codec = LibSvtAv1::new();
            if let Some(crf) = args.crf {
                codec = codec.with_crf(i32::from(crf));
            }
            if let Some(preset) = &args.preset {
                let preset: i32 = preset
                    .parse()
                    .with_context(|| format!("libsvtav1 preset must be a number, got '{}'", preset))?;
                codec = codec.with_preset(preset);
            }
            codec.into()
        }
    };

    Ok(filters
        .into_iter()
        .fold(StreamOptions::new().with_codec(codec), |options, filter| options.with_filter(filter)))
}

/// Per-stream options for audio from the command line
pub fn audio_options(args: &TranscodeArgs) -> StreamOptions {
    let codec: Codec = match args.audio_codec {
        AudioCodecArg::Copy => Codec::Copy,
        AudioCodecArg::Aac => bitrate(AudioCodec::aac(), args.audio_bitrate).into(),
        AudioCodecArg::Ac3 => bitrate(AudioCodec::ac3(), args.audio_bitrate).into(),
        AudioCodecArg::Libopus => bitrate(AudioCodec::libopus(), args.audio_bitrate).into(),
    };
    with_language(StreamOptions::new().with_codec(codec), args.language.as_deref())
}

fn bitrate(codec: AudioCodec, kbps: Option<u32>) -> AudioCodec {
    match kbps {
        Some(kbps) => codec.with_bitrate(kbps),
        None => codec,
    }
}

fn with_language(options: StreamOptions, code: Option<&str>) -> StreamOptions {
    match code {
        Some(code) => options.with_language(Language::from_code(code)),
        None => options,
    }
}

/// Assemble the job described by the transcode arguments
pub async fn build_transcode_job(
    container: &DefaultAppContainer,
    settings: &FfwrapSettings,
    args: &TranscodeArgs,
) -> Result<TranscodeJob> {
    for input in &args.inputs {
        ensure_exists(input)?;
    }

    let mut output = OutputFile::new(&args.output);
    if let Some(start) = args.start {
        output = output.with_start(start);
    }
    if let Some(stop) = args.stop {
        output = output.with_stop(stop);
    }
    if let Some(duration) = args.duration {
        output = output.with_duration(duration);
    }
    if let Some(bytes) = args.size_limit {
        output = output.with_size_limit(bytes);
    }
    if let Some(title) = &args.title {
        output = output.with_title(title);
    }

    let video = video_options(args)?;
    let audio = audio_options(args);
    let subtitles = with_language(StreamOptions::new(), args.language.as_deref());

    let mut builder = TranscodeBuilder::new(output);
    builder.overwrite(overwrite_policy(settings));

    let inspector = container.inspect_interactor();
    for input in &args.inputs {
        let analysis = inspector
            .analyse(input)
            .await
            .with_context(|| format!("Failed to inspect {}", input.display()))?;
        info!(
            "Input {}: {} streams, duration {}",
            input.display(),
            analysis.total_streams(),
            analysis.duration
        );

        let index = builder.add_input(FileInput::from_analysis(&analysis));
        builder.map_streams_from(index, &analysis, StreamKind::Video, &video);
        if !args.no_audio {
            builder.map_streams_from(index, &analysis, StreamKind::Audio, &audio);
        }
        if !args.no_subs {
            builder.map_streams_from(index, &analysis, StreamKind::Subtitle, &subtitles);
        }
    }

    Ok(builder.build())
}

/// Assemble the job described by the concat arguments
pub async fn build_concat_job(
    container: &DefaultAppContainer,
    settings: &FfwrapSettings,
    args: &ConcatArgs,
) -> Result<TranscodeJob> {
    for file in &args.files {
        ensure_exists(file)?;
    }

    let inspector = container.inspect_interactor();
    let mut analyses = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let analysis = inspector
            .analyse(file)
            .await
            .with_context(|| format!("Failed to inspect {}", file.display()))?;
        analyses.push(analysis);
    }

    let mut concat = ConcatInput::new();
    let mut position = TimeSpec::ZERO;
    for (id, analysis) in analyses.iter().enumerate() {
        let entry = ConcatEntry::from_analysis(analysis);
        let end = position + entry.effective_length();
        concat = concat.with_entry(entry);
        if args.chapters {
            concat = concat.with_chapter(id.to_string(), position, end);
        }
        position = end;
    }

    let mut output = OutputFile::new(&args.output);
    if let Some(title) = &args.title {
        output = output.with_title(title);
    }

    let mut builder = TranscodeBuilder::new(output);
    builder.overwrite(overwrite_policy(settings));
    let index = builder.add_input(concat);
    let copy = StreamOptions::new();
    // Stream layout comes from the first file; concat requires matching layouts
    if let Some(first) = analyses.first() {
        for kind in [StreamKind::Video, StreamKind::Audio, StreamKind::Subtitle] {
            builder.map_streams_from(index, first, kind, &copy);
        }
    }

    Ok(builder.build())
}

/// Run an assembled job, or print it when `dry_run` is set
pub async fn run_job(
    container: &DefaultAppContainer,
    settings: &FfwrapSettings,
    mut job: TranscodeJob,
    dry_run: bool,
) -> Result<()> {
    let interactor = container.transcode_interactor();

    if dry_run {
        job.prepare().context("Failed to prepare inputs")?;
        let rendered = job
            .to_arguments()
            .map(|args| display_command(&interactor.program(), &args));
        job.dispose();
        println!("{}", rendered.context("Failed to assemble ffmpeg command")?);
        return Ok(());
    }

    let dispatcher = progress_dispatcher(settings.progress);
    let report = interactor
        .execute(&mut job, &dispatcher)
        .await
        .context("Failed to run ffmpeg")?;

    for line in &report.stderr_tail {
        error!("ffmpeg: {}", line);
    }
    let report = report.into_result()?;
    info!(
        "Wrote {} in {:.1}s",
        job.output().path().display(),
        report.elapsed.as_secs_f64()
    );
    Ok(())
}

/// Execute the transcode command
pub async fn transcode(
    container: &DefaultAppContainer,
    settings: &FfwrapSettings,
    args: TranscodeArgs,
) -> Result<()> {
    info!("Starting transcode operation");
    let job = build_transcode_job(container, settings, &args).await?;
    run_job(container, settings, job, args.dry_run).await
}

/// Execute the concat command
pub async fn concat(
    container: &DefaultAppContainer,
    settings: &FfwrapSettings,
    args: ConcatArgs,
) -> Result<()> {
    info!("Starting concat of {} files", args.files.len());
    let job = build_concat_job(container, settings, &args).await?;
    run_job(container, settings, job, args.dry_run).await
}

/// Execute the inspect command
pub async fn inspect(container: &DefaultAppContainer, args: InspectArgs) -> Result<()> {
    info!("Starting inspect operation");
    ensure_exists(&args.input)?;

    let format = if args.json {
        InspectFormat::Json
    } else {
        InspectFormat::Text
    };
    let response = container
        .inspect_interactor()
        .execute(InspectRequest::new(&args.input).with_format(format))
        .await
        .context("Failed to inspect input file")?;

    println!("{}", response.summary);
    Ok(())
}
