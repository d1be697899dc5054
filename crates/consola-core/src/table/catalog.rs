// Stock columns and filter fields for each entity table.

use super::column::{Align, ColumnDef};
use super::filter::{FilterField, FilterFieldRegistry};
use crate::model::EntityKind;

const NOME: ColumnDef = ColumnDef::new("nome", "Nome").pinned();
const DESCRICAO: ColumnDef = ColumnDef::new("descricao", "Descrição").unsortable();
const ATIVO: ColumnDef = ColumnDef::new("ativo", "Ativo").align(Align::Center);

pub fn columns(kind: EntityKind) -> Vec<ColumnDef> {
    match kind {
        EntityKind::Area => vec![
            NOME,
            DESCRICAO,
            ColumnDef::new("cor", "Cor").unsortable(),
            ATIVO,
        ],
        EntityKind::Aplicacao => vec![
            NOME,
            ColumnDef::new("versao", "Versão"),
            ColumnDef::new("areaNome", "Área").sort_by("area.nome"),
            ATIVO,
        ],
        EntityKind::Modulo => vec![
            NOME,
            DESCRICAO,
            ColumnDef::new("aplicacaoNome", "Aplicação").sort_by("aplicacao.nome"),
            ATIVO,
        ],
        EntityKind::Funcionalidade => vec![
            NOME,
            DESCRICAO,
            ColumnDef::new("moduloNome", "Módulo").sort_by("modulo.nome"),
            ATIVO,
        ],
        EntityKind::Licenca => vec![
            ColumnDef::new("codigo", "Código").pinned(),
            ColumnDef::new("clienteNome", "Cliente").sort_by("cliente.nome"),
            ColumnDef::new("aplicacaoNome", "Aplicação").sort_by("aplicacao.nome"),
            ColumnDef::new("dataFim", "Validade"),
            ColumnDef::new("utilizadoresAtivos", "Utilizadores")
                .unsortable()
                .align(Align::Right),
            ColumnDef::new("bloqueada", "Bloqueada").align(Align::Center),
        ],
        EntityKind::Cliente => vec![
            NOME,
            ColumnDef::new("nif", "NIF"),
            ColumnDef::new("email", "Email"),
            ColumnDef::new("telefone", "Telefone").unsortable(),
            ColumnDef::new("temApiKey", "API key")
                .unsortable()
                .align(Align::Center),
            ATIVO,
        ],
        EntityKind::Utilizador => vec![
            NOME,
            ColumnDef::new("email", "Email"),
            ColumnDef::new("perfilNome", "Perfil").sort_by("perfil.nome"),
            ColumnDef::new("clienteNome", "Cliente").sort_by("cliente.nome"),
            ATIVO,
        ],
        EntityKind::Perfil => vec![NOME, DESCRICAO, ATIVO],
    }
}

pub fn filter_fields(kind: EntityKind) -> FilterFieldRegistry {
    let nome = FilterField::new("nome", "Nome", 1);
    let fields = match kind {
        EntityKind::Area | EntityKind::Perfil => vec![nome],
        EntityKind::Aplicacao => vec![nome, FilterField::new("areaId", "Área", 2)],
        EntityKind::Modulo => vec![nome, FilterField::new("aplicacaoId", "Aplicação", 2)],
        EntityKind::Funcionalidade => vec![nome, FilterField::new("moduloId", "Módulo", 2)],
        EntityKind::Licenca => vec![
            FilterField::new("codigo", "Código", 1),
            FilterField::new("clienteId", "Cliente", 2),
            FilterField::new("aplicacaoId", "Aplicação", 3),
        ],
        EntityKind::Cliente => vec![
            nome,
            FilterField::new("nif", "NIF", 2),
            FilterField::new("email", "Email", 3),
        ],
        EntityKind::Utilizador => vec![
            nome,
            FilterField::new("email", "Email", 2),
            FilterField::new("perfilId", "Perfil", 3),
            FilterField::new("clienteId", "Cliente", 4),
            FilterField::new("licencaId", "Licença", 5),
        ],
    };
    FilterFieldRegistry::new(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_filter_field_is_unique_per_kind() {
        for kind in EntityKind::iter() {
            let registry = filter_fields(kind);
            let mut ids: Vec<_> = registry.iter().map(|f| f.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), registry.len(), "{kind}");
        }
    }

    #[test]
    fn child_tables_accept_their_parent_seed() {
        for kind in EntityKind::iter() {
            if let Some(parent) = kind.parent() {
                assert!(
                    filter_fields(kind).contains(parent.seed_param()),
                    "{kind} should filter by {}",
                    parent.seed_param()
                );
            }
        }
    }
}
