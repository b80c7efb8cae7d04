use crate::gpu::{BlendMode, TextureId};

use super::{DrawCommand, TextureCmd};

/// Pending commands of one batch, in submission order.
///
/// Merging only ever extends the last entry; nothing is reordered.
#[derive(Debug, Default)]
pub struct CommandList {
    commands: Vec<DrawCommand>,
}

impl CommandList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Drops every command, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Appends `count` unfiltered textured triangles.
    ///
    /// Extends the previous command when it samples the same texture in the same
    /// mesh mode and carries no filter.
    pub fn push_texture(&mut self, texture: TextureId, count: u32, mesh: bool) {
        if let Some(DrawCommand::Texture(last)) = self.commands.last_mut() {
            if last.texture == texture && last.mesh == mesh && last.filter.is_none() {
                last.count += count;
                return;
            }
        }
        self.commands.push(DrawCommand::Texture(TextureCmd {
            texture,
            count,
            mesh,
            filter: None,
            uv: None,
        }));
    }

    /// Appends a filtered textured run. Filtered runs never merge.
    pub fn push_filtered(&mut self, cmd: TextureCmd) {
        debug_assert!(cmd.filter.is_some(), "push_filtered without a filter");
        self.commands.push(DrawCommand::Texture(cmd));
    }

    /// Appends `count` untextured triangles, merging with a preceding rect run.
    pub fn push_rect(&mut self, count: u32) {
        if let Some(DrawCommand::Rect { count: last }) = self.commands.last_mut() {
            *last += count;
            return;
        }
        self.commands.push(DrawCommand::Rect { count });
    }

    pub fn push_mask(&mut self, count: u32) {
        self.commands.push(DrawCommand::PushMask { count });
    }

    pub fn pop_mask(&mut self, count: u32) {
        self.commands.push(DrawCommand::PopMask { count });
    }

    /// Adds `count` triangles to the last geometry-carrying command.
    pub fn grow_last(&mut self, count: u32) {
        let last = self.commands.last_mut().and_then(DrawCommand::count_mut);
        debug_assert!(last.is_some(), "grow_last without a geometry command");
        if let Some(last) = last {
            *last += count;
        }
    }

    /// Records a blend switch, skipping switches that could never be observed.
    ///
    /// Walking back from the end: a blend change with no drawing after it is
    /// dropped; the first blend change that survives ends the walk, and if it
    /// already selects `mode` nothing is appended.
    pub fn set_blend(&mut self, mode: BlendMode) {
        let mut drawn = false;
        let mut i = self.commands.len();
        while i > 0 {
            i -= 1;
            let cmd = &self.commands[i];
            if cmd.is_drawing() {
                drawn = true;
            }
            if let DrawCommand::Blend(prev) = *cmd {
                if !drawn {
                    self.commands.remove(i);
                    continue;
                }
                if prev == mode {
                    return;
                }
                break;
            }
        }
        self.commands.push(DrawCommand::Blend(mode));
    }
}
