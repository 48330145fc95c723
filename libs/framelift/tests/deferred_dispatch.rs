// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Running the engine through the ordered command queue must be
//! indistinguishable from running it against the bare device.

use std::sync::Arc;

use framelift::gpu::{DeferredQueue, SoftwareDevice};
use framelift::{
    FramebufferFormats, FramebufferReader, PixelLayout, StaticFormats, TextureInfo,
};

const WIDTH: u32 = 16;
const HEIGHT: u32 = 4;
const FRAME_BYTES: usize = (WIDTH * HEIGHT * 4) as usize;

fn formats() -> Arc<StaticFormats> {
    Arc::new(StaticFormats(FramebufferFormats {
        color: PixelLayout::new(0x1908, 0x1401, 4),
        monochrome: PixelLayout::new(0x1903, 0x1401, 1),
    }))
}

fn texture() -> Arc<TextureInfo> {
    Arc::new(TextureInfo::new(WIDTH, HEIGHT, FRAME_BYTES))
}

#[test]
fn queued_dispatch_matches_direct_dispatch() {
    let scenario_frames = [0x11u8, 0x22, 0x33];

    // Direct: engine drives the device itself.
    let (direct_outs, direct_journal) = {
        let mut reader =
            FramebufferReader::new(SoftwareDevice::new(), texture(), formats()).unwrap();
        let mut outs = Vec::new();
        for value in scenario_frames {
            reader
                .device_mut()
                .set_framebuffer(WIDTH, vec![value; FRAME_BYTES]);
            outs.push(reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, false).unwrap().to_vec());
            reader.clean_up();
        }
        reader
            .device_mut()
            .set_framebuffer(WIDTH, vec![0x44; FRAME_BYTES]);
        outs.push(reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, true).unwrap().to_vec());
        reader.clean_up();
        (outs, reader.device_mut().take_journal())
    };

    // Queued: every fire-and-forget call goes through the deferral queue.
    let (queued_outs, queued_journal) = {
        let mut reader = FramebufferReader::new(
            DeferredQueue::new(SoftwareDevice::new()),
            texture(),
            formats(),
        )
        .unwrap();
        let mut outs = Vec::new();
        for value in scenario_frames {
            reader
                .device_mut()
                .inner_mut()
                .set_framebuffer(WIDTH, vec![value; FRAME_BYTES]);
            outs.push(reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, false).unwrap().to_vec());
            reader.clean_up();
        }
        reader
            .device_mut()
            .inner_mut()
            .set_framebuffer(WIDTH, vec![0x44; FRAME_BYTES]);
        outs.push(reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, true).unwrap().to_vec());
        reader.clean_up();
        // Drain the trailing clean_up commands so both devices saw the
        // complete sequence.
        reader.device_mut().flush();
        (outs, reader.device_mut().inner_mut().take_journal())
    };

    assert_eq!(direct_outs, queued_outs);
    assert_eq!(direct_journal, queued_journal);
}

#[test]
fn clean_up_commands_wait_for_the_next_synchronization_point() {
    let mut reader = FramebufferReader::new(
        DeferredQueue::new(SoftwareDevice::new()),
        texture(),
        formats(),
    )
    .unwrap();
    reader
        .device_mut()
        .inner_mut()
        .set_framebuffer(WIDTH, vec![0x11; FRAME_BYTES]);

    let _ = reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, true).unwrap();
    reader.clean_up();

    // The unmap and the unbind were submitted, not executed.
    assert_eq!(reader.device().pending(), 2);
    let last = reader.device().inner().journal().last().unwrap().clone();
    assert!(last.starts_with("map_buffer"), "unexpected tail op: {last}");

    // The next read's blocking capture is a synchronization point; the
    // deferred clean-up must land first, in order.
    let _ = reader.read_pixels(0, 0, WIDTH, HEIGHT, 32, true).unwrap();
    let journal = reader.device().inner().journal();
    let unmap_at = journal
        .iter()
        .position(|op| op.starts_with("unmap_buffer"))
        .expect("unmap executed");
    let read_at = journal
        .iter()
        .rposition(|op| op.starts_with("read_pixels"))
        .expect("read executed");
    assert!(unmap_at < read_at);
    reader.clean_up();
}
