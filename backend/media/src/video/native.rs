//! In-process decoding through libav* (`ffmpeg-native` feature).

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use ffmpeg_next::{
    codec, decoder,
    format::{input, Pixel},
    media::Type,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrame,
};
use gifsmith_core::MediaError;
use image::RgbaImage;
use tracing::debug;

use super::decoder::{SamplePlan, VideoDecoder};

#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDecoder;

impl NativeDecoder {
    pub fn new() -> Result<Self, MediaError> {
        ffmpeg_next::init().map_err(ffmpeg_error)?;
        Ok(Self)
    }
}

/// Per-run decode state.
struct Sampler<'a> {
    plan: &'a SamplePlan,
    scaler: ScalerContext,
    out_w: u32,
    out_h: u32,
    index: u64,
    frames: Vec<RgbaImage>,
}

impl Sampler<'_> {
    /// Pull every frame the decoder has ready.
    fn drain(&mut self, decoder: &mut decoder::Video, cancel: &AtomicBool) -> Result<(), MediaError> {
        let mut decoded = VideoFrame::empty();
        while decoder.receive_frame(&mut decoded).is_ok() {
            if cancel.load(Ordering::Relaxed) {
                return Err(MediaError::Decode("decode cancelled".into()));
            }
            if self.plan.keeps(self.index) {
                let mut rgba = VideoFrame::empty();
                self.scaler.run(&decoded, &mut rgba).map_err(ffmpeg_error)?;
                self.frames.push(copy_plane(&rgba, self.out_w, self.out_h)?);
            }
            self.index += 1;
        }
        Ok(())
    }
}

/// Copy the packed RGBA plane row by row, dropping stride padding.
fn copy_plane(frame: &VideoFrame, width: u32, height: u32) -> Result<RgbaImage, MediaError> {
    let data = frame.data(0);
    let stride = frame.stride(0);
    let row_len = width as usize * 4;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        let row = data
            .get(start..start + row_len)
            .ok_or_else(|| MediaError::Decode("scaled frame is truncated".into()))?;
        pixels.extend_from_slice(row);
    }
    RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| MediaError::Decode("scaled frame has the wrong size".into()))
}

impl VideoDecoder for NativeDecoder {
    fn decode(
        &self,
        path: &Path,
        plan: &SamplePlan,
        cancel: &AtomicBool,
    ) -> Result<Vec<RgbaImage>, MediaError> {
        let mut input_ctx = input(&path).map_err(ffmpeg_error)?;
        let stream = input_ctx
            .streams()
            .best(Type::Video)
            .ok_or_else(|| MediaError::Decode("no video stream".into()))?;
        let stream_index = stream.index();

        let decoder_ctx =
            codec::context::Context::from_parameters(stream.parameters()).map_err(ffmpeg_error)?;
        let mut decoder = decoder_ctx.decoder().video().map_err(ffmpeg_error)?;

        let (out_w, out_h) = plan.target_size(decoder.width(), decoder.height());
        if out_w == 0 || out_h == 0 {
            return Err(MediaError::Decode("video stream has no dimensions".into()));
        }
        let scaler = ScalerContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            out_w,
            out_h,
            ScalerFlags::BILINEAR,
        )
        .map_err(ffmpeg_error)?;

        let mut sampler = Sampler {
            plan,
            scaler,
            out_w,
            out_h,
            index: 0,
            frames: Vec::new(),
        };

        for (stream, packet) in input_ctx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet).map_err(ffmpeg_error)?;
            sampler.drain(&mut decoder, cancel)?;
        }
        decoder.send_eof().map_err(ffmpeg_error)?;
        sampler.drain(&mut decoder, cancel)?;

        debug!(decoded = sampler.index, kept = sampler.frames.len(), out_w, out_h, "Decoded video");
        if sampler.frames.is_empty() {
            return Err(MediaError::Decode("video contains no frames".into()));
        }
        Ok(sampler.frames)
    }
}

fn ffmpeg_error(err: ffmpeg_next::Error) -> MediaError {
    MediaError::Decode(format!("ffmpeg: {err}"))
}
