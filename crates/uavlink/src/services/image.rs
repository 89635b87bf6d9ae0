use super::{Service, ServiceContext};
use crate::outputs::{CompletedImage, ImageInfo};
use mavlink::common::{self, MavMessage};
use mavlink::MavHeader;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Reassembles chunked image transfers.
///
/// Chunks arrive as `ENCAPSULATED_DATA` in arbitrary order and are buffered
/// by sequence number. A `DATA_TRANSMISSION_HANDSHAKE` terminates the
/// transfer, declaring how many chunks were sent and how many payload bytes
/// each carries. A transfer whose observed chunks disagree with the
/// declaration is discarded rather than emitted partially; the buffer is
/// cleared after every handshake so stale chunks never leak into the next
/// transfer.
pub(crate) struct ImageTransferService {
    buffer: HashMap<u16, Vec<u8>>,
    image_dir: PathBuf,
    images: mpsc::Sender<CompletedImage>,
    index: u32,
}

impl ImageTransferService {
    pub fn new(image_dir: PathBuf, images: mpsc::Sender<CompletedImage>) -> Self {
        Self {
            buffer: HashMap::new(),
            image_dir,
            images,
            index: 0,
        }
    }

    fn on_handshake(&mut self, handshake: &common::DATA_TRANSMISSION_HANDSHAKE_DATA) {
        let received = self
            .buffer
            .keys()
            .max()
            .map(|max| usize::from(*max) + 1)
            .unwrap_or(0);
        if received == 0 {
            // No transfer was in progress; a bare handshake is the
            // vehicle announcing or us requesting, not terminating.
            debug!("image handshake with empty chunk buffer, ignoring");
            return;
        }

        let declared = usize::from(handshake.packets);
        if received != declared {
            warn!("image chunk count mismatch: declared {declared}, observed {received}");
            self.buffer.clear();
            return;
        }

        let chunk_payload = usize::from(handshake.payload);
        if chunk_payload == 0 {
            warn!("image handshake declares zero-byte chunks, discarding transfer");
            self.buffer.clear();
            return;
        }

        let mut payload = Vec::with_capacity(declared * chunk_payload);
        for seq in 0..handshake.packets {
            match self.buffer.get(&seq) {
                Some(chunk) => {
                    let take = chunk_payload.min(chunk.len());
                    payload.extend_from_slice(&chunk[..take]);
                }
                None => {
                    warn!("image chunk {seq} missing, discarding transfer");
                    self.buffer.clear();
                    return;
                }
            }
        }
        self.buffer.clear();

        let size = handshake.size as usize;
        if size > 0 && size < payload.len() {
            payload.truncate(size);
        }

        if let Err(err) = self.emit(payload, handshake) {
            warn!("failed to store reconstructed image: {err}");
        }
    }

    fn emit(
        &mut self,
        payload: Vec<u8>,
        handshake: &common::DATA_TRANSMISSION_HANDSHAKE_DATA,
    ) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.image_dir)?;

        let stem = Uuid::new_v4();
        let image_path = self.image_dir.join(format!("img_{stem}.jpg"));
        let info_path = self.image_dir.join(format!("img_{stem}.json"));

        std::fs::write(&image_path, &payload)?;

        let info = ImageInfo {
            index: self.index,
            size_bytes: payload.len() as u32,
            width: handshake.width,
            height: handshake.height,
            packets: handshake.packets,
            chunk_payload: handshake.payload,
            jpg_quality: handshake.jpg_quality,
        };
        let serialized = serde_json::to_string_pretty(&info)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
        std::fs::write(&info_path, serialized)?;

        self.index += 1;
        debug!("image reconstructed: {} bytes", payload.len());
        let _ = self.images.send(CompletedImage {
            image_path,
            info_path,
        });
        Ok(())
    }
}

impl Service for ImageTransferService {
    fn recv_message(&mut self, _ctx: &ServiceContext, _header: &MavHeader, message: &MavMessage) {
        match message {
            MavMessage::ENCAPSULATED_DATA(data) => {
                self.buffer.insert(data.seqnr, data.data.to_vec());
            }
            MavMessage::DATA_TRANSMISSION_HANDSHAKE(data) => {
                self.on_handshake(data);
            }
            _ => {}
        }
    }
}
