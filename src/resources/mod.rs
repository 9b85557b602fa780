//! Document-level registries of shared visual resources.
//!
//! Materials, spectrums and tessellations are persisted the same way: the
//! registry writes the description of the matching context module into its
//! document section and reads a section back into the module. One generic
//! [`ResourceRegistry`] covers all three through the [`ResourceModule`] trait.

use std::marker::PhantomData;

use serde_json::Value;

use crate::{
    context::{Context, ContextId},
    data_structures::{
        material::MaterialModule, spectrum::SpectrumModule, tessellation::TessellationModule,
    },
    document::Section,
    error::EngineError,
};

/// A context module whose contents are stored in one document section.
pub trait ResourceModule {
    const SECTION: Section;

    fn of(ctx: &Context) -> &Self;

    fn of_mut(ctx: &mut Context) -> &mut Self;

    fn write_description(&self) -> Result<Value, EngineError>;

    /// Must leave the module untouched when it fails.
    fn read_description(&mut self, description: &Value) -> Result<(), EngineError>;
}

impl ResourceModule for MaterialModule {
    const SECTION: Section = Section::Materials;

    fn of(ctx: &Context) -> &Self {
        &ctx.materials
    }

    fn of_mut(ctx: &mut Context) -> &mut Self {
        &mut ctx.materials
    }

    fn write_description(&self) -> Result<Value, EngineError> {
        MaterialModule::write_description(self)
    }

    fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        MaterialModule::read_description(self, description)
    }
}

impl ResourceModule for SpectrumModule {
    const SECTION: Section = Section::Spectrums;

    fn of(ctx: &Context) -> &Self {
        &ctx.spectrums
    }

    fn of_mut(ctx: &mut Context) -> &mut Self {
        &mut ctx.spectrums
    }

    fn write_description(&self) -> Result<Value, EngineError> {
        SpectrumModule::write_description(self)
    }

    fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        SpectrumModule::read_description(self, description)
    }
}

impl ResourceModule for TessellationModule {
    const SECTION: Section = Section::Tessellations;

    fn of(ctx: &Context) -> &Self {
        &ctx.tessellations
    }

    fn of_mut(ctx: &mut Context) -> &mut Self {
        &mut ctx.tessellations
    }

    fn write_description(&self) -> Result<Value, EngineError> {
        TessellationModule::write_description(self)
    }

    fn read_description(&mut self, description: &Value) -> Result<(), EngineError> {
        TessellationModule::read_description(self, description)
    }
}

/// Named resources of module `M`, scoped to the context it was created for.
pub struct ResourceRegistry<M> {
    context: ContextId,
    _module: PhantomData<fn() -> M>,
}

pub type Materials = ResourceRegistry<MaterialModule>;
pub type Spectrums = ResourceRegistry<SpectrumModule>;
pub type Tessellations = ResourceRegistry<TessellationModule>;

impl<M: ResourceModule> ResourceRegistry<M> {
    pub fn new(ctx: &Context) -> Self {
        Self {
            context: ctx.id(),
            _module: PhantomData,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.context
    }

    pub fn section(&self) -> Section {
        M::SECTION
    }

    pub fn serialize(&self, ctx: &Context) -> Result<Value, EngineError> {
        ctx.check_scope(self.context)?;
        M::of(ctx).write_description()
    }

    pub fn deserialize(&mut self, ctx: &mut Context, blob: &Value) -> Result<(), EngineError> {
        ctx.check_scope(self.context)?;
        M::of_mut(ctx).read_description(blob)?;
        log::debug!("read {} into context '{}'", M::SECTION, ctx.name());
        Ok(())
    }
}

impl<M> std::fmt::Debug for ResourceRegistry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("context", &self.context)
            .field("module", &std::any::type_name::<M>())
            .finish()
    }
}
