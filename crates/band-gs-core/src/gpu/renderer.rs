//! Command encoder, double-buffer coordinator, and upload scheduler.
//!
//! Drawing calls append records to the back display list. `commit` swaps the
//! lists and the upload scheduler then re-walks the front list once per
//! display band, re-deriving each triangle's interpolation increments for
//! that band's rows, and streams the repacked records over the bus whenever
//! it is clear to send. Everything is cooperative: no call blocks except
//! `commit`, whose spin on the scheduler is the frame barrier.

use core::marker::PhantomData;

use band_gs_hal::BusTransport;
use glam::{IVec4, Vec2, Vec4};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::codec::{self, CommandWord, OpClass, TextureSize, BUS_ALIGN};
use super::display_list::{DisplayList, ListState};
use super::interface::{
    BlendFunc, LogicOp, Render, TestFunc, TexEnvMode, TexEnvParamName, TexEnvTarget,
    TextureWrapMode,
};
use super::raster::{RasterizedTriangle, Rasterizer};
use super::regs::{ConfReg1, ConfReg2};

/// Size of the hardware-facing transfer buffer in bytes. One bus write
/// never exceeds this, for records and raw texture chunks alike.
pub const HARDWARE_BUFFER_SIZE: usize = 2048;

/// Texture descriptors one display list can hold.
const TEXTURE_SLOTS: usize = 32;

type UploadList = DisplayList<HARDWARE_BUFFER_SIZE, BUS_ALIGN>;

/// Aligned wire size of a rasterized-triangle payload.
const TRIANGLE_PAYLOAD_SIZE: usize = UploadList::record_size::<RasterizedTriangle>();

/// Worst-case slot demand of one record: command word plus triangle payload.
const WORST_CASE_RECORD: usize = UploadList::record_size::<CommandWord>() + TRIANGLE_PAYLOAD_SIZE;

/// Driver error, generic over transport errors.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderError<E: core::fmt::Debug> {
    /// The back display list has no room for the record. The list is
    /// unchanged; flushing (committing) sooner recovers.
    ListFull,
    /// Texture geometry the hardware cannot take. Nothing was encoded.
    UnsupportedTexture,
    /// Declared-but-absent capability (logic ops). Nothing was encoded.
    Unsupported,
    /// Bus transport error.
    Transport(E),
}

impl<E: core::fmt::Debug> From<E> for RenderError<E> {
    fn from(e: E) -> Self {
        RenderError::Transport(e)
    }
}

/// Result of one non-blocking scheduler step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UploadStatus {
    /// The front list (or an in-flight texture) still has data to move.
    InProgress,
    /// Nothing left to transfer; the front list is free again.
    Idle,
}

/// In-stream texture record: an index into the owning list's descriptor
/// table. The pixel data itself never enters the display list.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
struct TextureSlot {
    index: u16,
}

/// The texture upload in flight, if any. `remaining() == 0` means idle.
#[derive(Clone, Copy)]
struct TextureStream {
    pixels: &'static [u16],
    offset: usize,
}

impl TextureStream {
    const IDLE: Self = Self {
        pixels: &[],
        offset: 0,
    };

    fn remaining(&self) -> usize {
        self.pixels.len() - self.offset
    }

    /// Resume position within the source memory. After a completed upload
    /// this is the one-past-the-end pointer of its pixel range.
    fn position(&self) -> *const u16 {
        self.pixels.as_ptr().wrapping_add(self.offset)
    }
}

/// One display list plus the texture descriptors referenced from it.
struct FrameList<const SIZE: usize> {
    list: DisplayList<SIZE, BUS_ALIGN>,
    textures: heapless::Vec<&'static [u16], TEXTURE_SLOTS>,
}

impl<const SIZE: usize> FrameList<SIZE> {
    const fn new() -> Self {
        Self {
            list: DisplayList::new(),
            textures: heapless::Vec::new(),
        }
    }

    fn clear(&mut self) {
        self.list.clear();
        self.textures.clear();
    }
}

/// Host-side renderer front end, generic over the bus transport and the
/// rasterization oracle.
///
/// `DISPLAY_LINES` horizontal bands of `LINE_RESOLUTION` rows each make up
/// the output image; each band is transferred as an independent unit.
pub struct Renderer<
    B,
    R,
    const DISPLAY_LIST_SIZE: usize = 2048,
    const DISPLAY_LINES: usize = 1,
    const LINE_RESOLUTION: usize = 128,
> where
    B: BusTransport,
    R: Rasterizer,
{
    bus: B,
    lists: [FrameList<DISPLAY_LIST_SIZE>; 2],
    upload: UploadList,
    front: usize,
    back: usize,
    /// Band currently being uploaded; walks from `DISPLAY_LINES - 1` to 0.
    band: usize,
    tex_stream: TextureStream,
    conf_reg1: ConfReg1,
    conf_reg2: ConfReg2,
    _rasterizer: PhantomData<R>,
}

impl<
        B,
        R,
        const DISPLAY_LIST_SIZE: usize,
        const DISPLAY_LINES: usize,
        const LINE_RESOLUTION: usize,
    > Renderer<B, R, DISPLAY_LIST_SIZE, DISPLAY_LINES, LINE_RESOLUTION>
where
    B: BusTransport,
    R: Rasterizer,
{
    /// Create the renderer and encode the hardware reset state into the
    /// first frame's display list.
    pub fn new(bus: B) -> Result<Self, RenderError<B::Error>> {
        debug_assert!(DISPLAY_LINES > 0);

        let mut renderer = Self {
            bus,
            lists: [FrameList::new(), FrameList::new()],
            upload: UploadList::new(),
            front: 0,
            back: 1,
            band: 0,
            tex_stream: TextureStream::IDLE,
            conf_reg1: ConfReg1::default(),
            conf_reg2: ConfReg2::default(),
            _rasterizer: PhantomData,
        };

        renderer
            .conf_reg2
            .set_perspective_correction(cfg!(not(feature = "no-persp-correct")));

        renderer.set_depth_func(TestFunc::Less)?;
        renderer.set_depth_mask(false)?;
        renderer.set_color_mask(true, true, true, true)?;
        renderer.set_alpha_func(TestFunc::Always, 0xF)?;
        renderer.set_tex_env(
            TexEnvTarget::TextureEnv,
            TexEnvParamName::TextureEnvMode,
            TexEnvMode::Modulate,
        )?;
        renderer.set_blend_func(BlendFunc::One, BlendFunc::Zero)?;
        renderer.set_tex_env_color(IVec4::ZERO)?;
        renderer.set_clear_color(IVec4::ZERO)?;
        renderer.set_clear_depth(0xFFFF)?;

        Ok(renderer)
    }

    /// Free bytes left in the back (writable) display list.
    pub fn free_space(&self) -> usize {
        self.lists[self.back].list.free_space()
    }

    /// Lifecycle state of the front (transferring) display list.
    pub fn front_state(&self) -> ListState {
        self.lists[self.front].list.state()
    }

    /// Draw a flat-colored triangle. Entirely invisible triangles succeed
    /// without touching the display list.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangle(
        &mut self,
        v0: Vec4,
        v1: Vec4,
        v2: Vec4,
        st0: Vec2,
        st1: Vec2,
        st2: Vec2,
        color: IVec4,
    ) -> Result<(), RenderError<B::Error>> {
        let mut tri = RasterizedTriangle::default();
        if !R::rasterize(&mut tri, v0, st0, v1, st1, v2, st2) {
            return Ok(());
        }
        tri.static_color = codec::pack_rgba4444(color);

        let result = self.append_command(codec::triangle_stream(TRIANGLE_PAYLOAD_SIZE), tri);
        // Cheap enough to attempt after every triangle; encoding itself
        // never waits on the bus.
        self.poll_upload()?;
        result
    }

    /// Bind a texture for the triangles that follow. Only the descriptor is
    /// encoded; pixels stream straight from `pixels` during upload, which
    /// is why the slice must outlive the renderer (`'static`).
    ///
    /// Re-binding the same slice is detected during upload by pointer-range
    /// contiguity and skipped. Reusing one memory region for different
    /// texture contents defeats that check; give each texture its own
    /// storage.
    pub fn use_texture(
        &mut self,
        pixels: &'static [u16],
        width: u16,
        height: u16,
    ) -> Result<(), RenderError<B::Error>> {
        let size = TextureSize::from_dimensions(width, height)
            .ok_or(RenderError::UnsupportedTexture)?;
        if pixels.len() != size.pixel_count() {
            return Err(RenderError::UnsupportedTexture);
        }

        let frame = &mut self.lists[self.back];
        let index = frame.textures.len() as u16;
        if frame.textures.push(pixels).is_err() {
            return Err(RenderError::ListFull);
        }
        if frame.list.push(size.word()).is_err() {
            frame.textures.pop();
            return Err(RenderError::ListFull);
        }
        if frame.list.push(TextureSlot { index }).is_err() {
            frame.list.remove::<CommandWord>();
            frame.textures.pop();
            return Err(RenderError::ListFull);
        }
        Ok(())
    }

    /// Encode a framebuffer memset for the selected targets. Selecting
    /// neither degrades to a no-op record.
    pub fn clear(
        &mut self,
        color_buffer: bool,
        depth_buffer: bool,
    ) -> Result<(), RenderError<B::Error>> {
        let mut word = codec::NOP;
        if color_buffer {
            word = codec::FRAMEBUFFER_MEMSET | codec::FRAMEBUFFER_COLOR;
        }
        if depth_buffer {
            word |= codec::FRAMEBUFFER_MEMSET | codec::FRAMEBUFFER_DEPTH;
        }
        self.lists[self.back]
            .list
            .push(word)
            .map_err(|_| RenderError::ListFull)
    }

    pub fn set_clear_color(&mut self, color: IVec4) -> Result<(), RenderError<B::Error>> {
        self.append_command(codec::SET_CLEAR_COLOR, codec::pack_rgba4444(color))
    }

    pub fn set_clear_depth(&mut self, depth: u16) -> Result<(), RenderError<B::Error>> {
        self.append_command(codec::SET_CLEAR_DEPTH, depth)
    }

    pub fn set_depth_mask(&mut self, enable: bool) -> Result<(), RenderError<B::Error>> {
        self.conf_reg1.set_depth_mask(enable);
        self.write_conf_reg1()
    }

    pub fn enable_depth_test(&mut self, enable: bool) -> Result<(), RenderError<B::Error>> {
        self.conf_reg1.set_enable_depth_test(enable);
        self.write_conf_reg1()
    }

    pub fn set_color_mask(
        &mut self,
        r: bool,
        g: bool,
        b: bool,
        a: bool,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg1.set_color_mask(r, g, b, a);
        self.write_conf_reg1()
    }

    pub fn set_depth_func(&mut self, func: TestFunc) -> Result<(), RenderError<B::Error>> {
        self.conf_reg1.set_depth_func(func);
        self.write_conf_reg1()
    }

    pub fn set_alpha_func(
        &mut self,
        func: TestFunc,
        reference: u8,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg1.set_alpha_func(func);
        self.conf_reg1.set_alpha_ref(reference);
        self.write_conf_reg1()
    }

    /// Only `TextureEnv` / `TextureEnvMode` exist on this hardware; the
    /// target and parameter name are accepted for interface completeness.
    pub fn set_tex_env(
        &mut self,
        _target: TexEnvTarget,
        _pname: TexEnvParamName,
        mode: TexEnvMode,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg2.set_tex_env_func(mode);
        self.write_conf_reg2()
    }

    pub fn set_blend_func(
        &mut self,
        sfactor: BlendFunc,
        dfactor: BlendFunc,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg2.set_blend_sfactor(sfactor);
        self.conf_reg2.set_blend_dfactor(dfactor);
        self.write_conf_reg2()
    }

    /// The hardware has no logic-op slot; this always fails and encodes
    /// nothing.
    pub fn set_logic_op(&mut self, _op: LogicOp) -> Result<(), RenderError<B::Error>> {
        Err(RenderError::Unsupported)
    }

    pub fn set_tex_env_color(&mut self, color: IVec4) -> Result<(), RenderError<B::Error>> {
        self.append_command(codec::SET_TEX_ENV_COLOR, codec::pack_rgba4444(color))
    }

    pub fn set_texture_wrap_mode_s(
        &mut self,
        mode: TextureWrapMode,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg2
            .set_tex_clamp_s(mode == TextureWrapMode::ClampToEdge);
        self.write_conf_reg2()
    }

    pub fn set_texture_wrap_mode_t(
        &mut self,
        mode: TextureWrapMode,
    ) -> Result<(), RenderError<B::Error>> {
        self.conf_reg2
            .set_tex_clamp_t(mode == TextureWrapMode::ClampToEdge);
        self.write_conf_reg2()
    }

    /// End the frame: append the frame-end marker, drain the previous
    /// frame, swap lists, and kick off the new transfer.
    ///
    /// If the marker does not fit, the whole back list is discarded and
    /// `ListFull` returned: sending a frame without its commit marker would
    /// shift the display's line cadence, which is worse than dropping the
    /// frame.
    pub fn commit(&mut self) -> Result<(), RenderError<B::Error>> {
        let marker = codec::FRAMEBUFFER_COMMIT | codec::FRAMEBUFFER_COLOR;
        if self.lists[self.back].list.push(marker).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("display list full at commit, dropping frame");
            self.lists[self.back].clear();
            return Err(RenderError::ListFull);
        }

        // Barrier: the hardware never has two outstanding frames. Spin
        // until the previous front list has fully drained.
        while self.poll_upload()? == UploadStatus::InProgress {}

        self.lists[self.back].list.enqueue();
        core::mem::swap(&mut self.front, &mut self.back);

        self.poll_upload()?;
        Ok(())
    }

    /// One non-blocking scheduler step. Returns `InProgress` while the
    /// committed frame (or an in-flight texture) still has data to move.
    /// Safe to call from anywhere; does nothing when the bus is busy.
    pub fn poll_upload(&mut self) -> Result<UploadStatus, RenderError<B::Error>> {
        if !self.bus.clear_to_send() {
            return Ok(UploadStatus::InProgress);
        }

        if self.lists[self.front].list.state() == ListState::Queued {
            // Bands go out last-first: the physical output is upside down
            // relative to logical scan order.
            self.band = DISPLAY_LINES - 1;
            self.lists[self.front].list.transfer();
        }

        if self.lists[self.front].list.state() != ListState::Transferring {
            return Ok(UploadStatus::Idle);
        }

        // A texture mid-flight takes priority over record packing: the
        // consumer expects its pixel bytes contiguous on the bus.
        if self.tex_stream.remaining() > 0 {
            let chunk_pixels = HARDWARE_BUFFER_SIZE / core::mem::size_of::<u16>();
            let end = (self.tex_stream.offset + chunk_pixels).min(self.tex_stream.pixels.len());
            let chunk = &self.tex_stream.pixels[self.tex_stream.offset..end];
            self.bus.write_data(chunk.as_bytes())?;
            self.tex_stream.offset = end;
            return Ok(UploadStatus::InProgress);
        }

        self.pack_band();
        self.bus.start_color_buffer_transfer(self.band)?;
        self.bus.write_data(self.upload.as_bytes())?;

        let front = &mut self.lists[self.front];
        if front.list.at_end() {
            front.list.reset_get();
            if self.band == 0 {
                front.clear();
                return Ok(UploadStatus::Idle);
            }
            self.band -= 1;
        }
        Ok(UploadStatus::InProgress)
    }

    /// Rebuild the transfer buffer with the front-list records that apply
    /// to the current band, until the buffer is nearly full or a texture
    /// upload must interleave.
    fn pack_band(&mut self) {
        self.upload.clear();

        let band_row_start = (self.band * LINE_RESOLUTION) as u16;
        let band_row_end = ((self.band + 1) * LINE_RESOLUTION) as u16;

        let frame = &mut self.lists[self.front];
        let upload = &mut self.upload;

        let mut suspend = false;
        while !suspend && upload.free_space() >= WORST_CASE_RECORD {
            let Some(op) = frame.list.get_next::<CommandWord>() else {
                break;
            };
            if upload.push(op).is_err() {
                break;
            }

            match OpClass::of(op) {
                Some(OpClass::TriangleStream) => {
                    let Some(tri) = frame.list.get_next::<RasterizedTriangle>() else {
                        upload.remove::<CommandWord>();
                        break;
                    };
                    let mut banded = RasterizedTriangle::default();
                    if R::calc_line_increment(&mut banded, &tri, band_row_start, band_row_end) {
                        if upload.push(banded).is_err() {
                            upload.remove::<CommandWord>();
                            suspend = true;
                        }
                    } else {
                        // Triangle does not touch this band; drop the
                        // record for this band only.
                        upload.remove::<CommandWord>();
                    }
                }
                Some(OpClass::Framebuffer) | Some(OpClass::Nop) => {}
                Some(OpClass::TextureStream) => {
                    let Some(slot) = frame.list.get_next::<TextureSlot>() else {
                        upload.remove::<CommandWord>();
                        break;
                    };
                    let pixels = frame
                        .textures
                        .get(slot.index as usize)
                        .copied()
                        .unwrap_or(&[]);

                    let resume = self.tex_stream.position();
                    let new_end = pixels.as_ptr().wrapping_add(pixels.len());
                    if core::ptr::eq(new_end, resume) {
                        // Tail-contiguous with the previous upload: the
                        // texture is already in device memory. Fast-forward
                        // past it and drop the record.
                        self.tex_stream = TextureStream {
                            pixels,
                            offset: pixels.len(),
                        };
                        upload.remove::<CommandWord>();
                    } else {
                        // Fresh upload. Its pixels must follow this packet
                        // on the bus, so stop packing records here.
                        self.tex_stream = TextureStream { pixels, offset: 0 };
                        suspend = true;
                    }
                }
                Some(OpClass::SetReg) => {
                    let Some(arg) = frame.list.get_next::<u16>() else {
                        upload.remove::<CommandWord>();
                        break;
                    };
                    if upload.push(arg).is_err() {
                        upload.remove::<CommandWord>();
                        suspend = true;
                    }
                }
                None => {
                    // Unknown op class: skip defensively rather than
                    // desynchronize the stream.
                    upload.remove::<CommandWord>();
                }
            }
        }
    }

    fn write_conf_reg1(&mut self) -> Result<(), RenderError<B::Error>> {
        let word = self.conf_reg1.word();
        self.append_command(codec::SET_CONF_REG1, word)
    }

    fn write_conf_reg2(&mut self) -> Result<(), RenderError<B::Error>> {
        let word = self.conf_reg2.word();
        self.append_command(codec::SET_CONF_REG2, word)
    }

    /// Append a command word and its payload to the back list, all or
    /// nothing: on a partial allocation the op word is rolled back before
    /// returning, so a failed call leaves the append cursor untouched.
    fn append_command<T: super::display_list::Record>(
        &mut self,
        op: CommandWord,
        arg: T,
    ) -> Result<(), RenderError<B::Error>> {
        let list = &mut self.lists[self.back].list;
        if list.push(op).is_err() {
            return Err(RenderError::ListFull);
        }
        if list.push(arg).is_err() {
            list.remove::<CommandWord>();
            return Err(RenderError::ListFull);
        }
        Ok(())
    }
}

impl<
        B,
        R,
        const DISPLAY_LIST_SIZE: usize,
        const DISPLAY_LINES: usize,
        const LINE_RESOLUTION: usize,
    > Render for Renderer<B, R, DISPLAY_LIST_SIZE, DISPLAY_LINES, LINE_RESOLUTION>
where
    B: BusTransport,
    R: Rasterizer,
{
    type Error = RenderError<B::Error>;

    fn draw_triangle(
        &mut self,
        v0: Vec4,
        v1: Vec4,
        v2: Vec4,
        st0: Vec2,
        st1: Vec2,
        st2: Vec2,
        color: IVec4,
    ) -> Result<(), Self::Error> {
        Renderer::draw_triangle(self, v0, v1, v2, st0, st1, st2, color)
    }

    fn use_texture(
        &mut self,
        pixels: &'static [u16],
        width: u16,
        height: u16,
    ) -> Result<(), Self::Error> {
        Renderer::use_texture(self, pixels, width, height)
    }

    fn clear(&mut self, color_buffer: bool, depth_buffer: bool) -> Result<(), Self::Error> {
        Renderer::clear(self, color_buffer, depth_buffer)
    }

    fn set_clear_color(&mut self, color: IVec4) -> Result<(), Self::Error> {
        Renderer::set_clear_color(self, color)
    }

    fn set_clear_depth(&mut self, depth: u16) -> Result<(), Self::Error> {
        Renderer::set_clear_depth(self, depth)
    }

    fn set_depth_mask(&mut self, enable: bool) -> Result<(), Self::Error> {
        Renderer::set_depth_mask(self, enable)
    }

    fn enable_depth_test(&mut self, enable: bool) -> Result<(), Self::Error> {
        Renderer::enable_depth_test(self, enable)
    }

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) -> Result<(), Self::Error> {
        Renderer::set_color_mask(self, r, g, b, a)
    }

    fn set_depth_func(&mut self, func: TestFunc) -> Result<(), Self::Error> {
        Renderer::set_depth_func(self, func)
    }

    fn set_alpha_func(&mut self, func: TestFunc, reference: u8) -> Result<(), Self::Error> {
        Renderer::set_alpha_func(self, func, reference)
    }

    fn set_tex_env(
        &mut self,
        target: TexEnvTarget,
        pname: TexEnvParamName,
        mode: TexEnvMode,
    ) -> Result<(), Self::Error> {
        Renderer::set_tex_env(self, target, pname, mode)
    }

    fn set_blend_func(
        &mut self,
        sfactor: BlendFunc,
        dfactor: BlendFunc,
    ) -> Result<(), Self::Error> {
        Renderer::set_blend_func(self, sfactor, dfactor)
    }

    fn set_logic_op(&mut self, op: LogicOp) -> Result<(), Self::Error> {
        Renderer::set_logic_op(self, op)
    }

    fn set_tex_env_color(&mut self, color: IVec4) -> Result<(), Self::Error> {
        Renderer::set_tex_env_color(self, color)
    }

    fn set_texture_wrap_mode_s(&mut self, mode: TextureWrapMode) -> Result<(), Self::Error> {
        Renderer::set_texture_wrap_mode_s(self, mode)
    }

    fn set_texture_wrap_mode_t(&mut self, mode: TextureWrapMode) -> Result<(), Self::Error> {
        Renderer::set_texture_wrap_mode_t(self, mode)
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        Renderer::commit(self)
    }
}
