/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
use std::any::Any;
use std::fmt::Debug;

use dyn_clone::DynClone;

/// A deserialized payload held in an [`Envelope`](crate::Envelope) body slot.
///
/// The trait combines `Any + Send + Sync + Debug` with [`DynClone`] so that a
/// type-erased payload can cross threads, be cloned along with its envelope, and be
/// downcast back to the concrete contract type by the handler that asked for it.
///
/// A blanket implementation covers every `T: Any + Send + Sync + Debug + Clone`, so
/// contract types never implement it by hand.
pub trait BusPayload: DynClone + Any + Send + Sync + Debug {
    /// Returns the payload as a dynamic [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns the payload as a mutable dynamic [`Any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

dyn_clone::clone_trait_object!(BusPayload);

impl<T> BusPayload for T
where
    T: Any + Send + Sync + Debug + DynClone + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
